use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::AuthError;
use crate::params::{
    RefreshTokenRequest, ResetPasswordRequest, SignInRequest, SignUpRequest,
    UpdatePasswordRequest, VerifyRequest,
};
use crate::types::{AuthResponse, User};

/// The fixed set of auth API calls, each with one method and one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endpoint {
    SignUp,
    PasswordGrant,
    Otp,
    Verify,
    Recover,
    UpdateUser,
    RefreshGrant,
    GetUser,
    Logout,
}

impl Endpoint {
    pub(crate) fn method(self) -> Method {
        match self {
            Self::UpdateUser => Method::PUT,
            Self::GetUser => Method::GET,
            _ => Method::POST,
        }
    }

    /// Path relative to `/auth/v1`, possibly carrying a query string.
    pub(crate) fn path(self) -> &'static str {
        match self {
            Self::SignUp => "/signup",
            Self::PasswordGrant => "/token?grant_type=password",
            Self::Otp => "/otp",
            Self::Verify => "/verify",
            Self::Recover => "/recover",
            Self::UpdateUser | Self::GetUser => "/user",
            Self::RefreshGrant => "/token?grant_type=refresh_token",
            Self::Logout => "/logout",
        }
    }
}

/// HTTP client for the Supabase GoTrue auth API at `/auth/v1/...`.
///
/// Usually obtained from `SupabaseClient::auth()`, which shares the client's
/// transport and default headers. [`AuthClient::new`] builds a standalone one.
///
/// # Example
/// ```ignore
/// use supabase_orm_auth::{AuthClient, SignInRequest};
///
/// let auth = AuthClient::new("https://your-project.supabase.co", "your-anon-key")?;
/// let session = auth
///     .sign_in_with_password(&SignInRequest::password("user@example.com", "password"))
///     .await?;
/// println!("token expires at {:?}", session.expires_at);
/// ```
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AuthClient {
    /// Create a standalone auth client with its own transport.
    ///
    /// `supabase_url` is the project URL (e.g., `https://your-project.supabase.co`).
    /// `api_key` is sent as the `apikey` header on every call.
    pub fn new(supabase_url: &str, api_key: &str) -> Result<Self, AuthError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            "apikey",
            HeaderValue::from_str(api_key)
                .map_err(|e| AuthError::InvalidConfig(format!("Invalid API key header: {}", e)))?,
        );
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(AuthError::Http)?;

        Self::with_http(http, supabase_url)
    }

    /// Create an auth client on top of an existing transport.
    ///
    /// The transport is expected to already carry the `apikey` default header.
    pub fn with_http(http: reqwest::Client, supabase_url: &str) -> Result<Self, AuthError> {
        let base = supabase_url.trim_end_matches('/');
        let base_url = Url::parse(&format!("{}/auth/v1", base))?;
        Ok(Self { http, base_url })
    }

    /// Get the base URL for the auth API.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ─── Sign Up / Sign In ─────────────────────────────────────

    /// Register a new user. `POST /signup`.
    pub async fn sign_up(&self, req: &SignUpRequest) -> Result<AuthResponse, AuthError> {
        let resp = self.send(self.request(Endpoint::SignUp, None).json(req)).await?;
        Self::decode_auth_response(resp).await
    }

    /// Sign in with email and password. `POST /token?grant_type=password`.
    pub async fn sign_in_with_password(
        &self,
        req: &SignInRequest,
    ) -> Result<AuthResponse, AuthError> {
        let resp = self
            .send(self.request(Endpoint::PasswordGrant, None).json(req))
            .await?;
        Self::decode_auth_response(resp).await
    }

    /// Send a one-time password / magic link. `POST /otp`.
    pub async fn sign_in_with_otp(&self, req: &SignInRequest) -> Result<(), AuthError> {
        self.send(self.request(Endpoint::Otp, None).json(req)).await?;
        Ok(())
    }

    /// Verify a one-time password or magic-link token. `POST /verify`.
    pub async fn verify(&self, req: &VerifyRequest) -> Result<AuthResponse, AuthError> {
        let resp = self.send(self.request(Endpoint::Verify, None).json(req)).await?;
        Self::decode_auth_response(resp).await
    }

    // ─── Password ──────────────────────────────────────────────

    /// Send a password reset email. `POST /recover`.
    pub async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<(), AuthError> {
        self.send(self.request(Endpoint::Recover, None).json(req)).await?;
        Ok(())
    }

    /// Change the password of the user owning `access_token`. `PUT /user`.
    pub async fn update_password(
        &self,
        req: &UpdatePasswordRequest,
        access_token: &str,
    ) -> Result<(), AuthError> {
        self.send(self.request(Endpoint::UpdateUser, Some(access_token)).json(req))
            .await?;
        Ok(())
    }

    // ─── Session ───────────────────────────────────────────────

    /// Exchange a refresh token for a new session. `POST /token?grant_type=refresh_token`.
    pub async fn refresh_token(
        &self,
        req: &RefreshTokenRequest,
    ) -> Result<AuthResponse, AuthError> {
        let resp = self
            .send(self.request(Endpoint::RefreshGrant, None).json(req))
            .await?;
        Self::decode_auth_response(resp).await
    }

    /// Fetch the user owning `access_token`. `GET /user`.
    pub async fn get_user(&self, access_token: &str) -> Result<User, AuthError> {
        let resp = self
            .send(self.request(Endpoint::GetUser, Some(access_token)))
            .await?;
        decode(resp).await
    }

    /// Invalidate the session of `access_token`. `POST /logout`.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.send(self.request(Endpoint::Logout, Some(access_token)))
            .await?;
        Ok(())
    }

    // ─── Internal Helpers ──────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let current = url.path().to_string();
        // path may contain query string (e.g. "/token?grant_type=password")
        if let Some(query_start) = path.find('?') {
            url.set_path(&format!("{}{}", current, &path[..query_start]));
            url.set_query(Some(&path[query_start + 1..]));
        } else {
            url.set_path(&format!("{}{}", current, path));
        }
        url
    }

    /// Start a request for `endpoint`. A token overrides the default
    /// `Authorization` header with `Bearer <token>`.
    pub(crate) fn request(&self, endpoint: Endpoint, access_token: Option<&str>) -> RequestBuilder {
        let request = self.http.request(endpoint.method(), self.url(endpoint.path()));
        match access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, AuthError> {
        let request = request.build()?;
        debug!(method = %request.method(), url = %request.url(), "Sending auth request");

        let resp = self.http.execute(request).await?;
        let status = resp.status().as_u16();
        if status >= 400 {
            let body = resp.text().await?;
            debug!(status, "Auth request failed");
            return Err(AuthError::Api { status, body });
        }
        Ok(resp)
    }

    async fn decode_auth_response(resp: reqwest::Response) -> Result<AuthResponse, AuthError> {
        let body: AuthResponse = decode(resp).await?;
        Ok(body.with_expiry_from(Utc::now()))
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, AuthError> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
