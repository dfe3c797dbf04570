use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use supabase_orm_auth::AuthClient;
use tracing::debug;
use url::Url;

use crate::config::SupabaseConfig;
use crate::error::{SupabaseError, SupabaseResult};

/// The main client for talking to a Supabase project over HTTP.
///
/// Holds one shared transport carrying the default headers (`apikey`,
/// `Authorization: Bearer <key>`, `Content-Type: application/json` plus any
/// configured extras) and the auth facade built on top of it. Cloning is cheap
/// and clones share the same transport.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    config: Arc<SupabaseConfig>,
    default_headers: Arc<HeaderMap>,
    auth: AuthClient,
}

impl SupabaseClient {
    /// Create a new client from a configuration.
    pub fn new(config: SupabaseConfig) -> SupabaseResult<Self> {
        // Fail early on a malformed project URL
        Url::parse(config.base_url())?;

        let default_headers = build_default_headers(&config)?;

        let mut builder = reqwest::Client::builder().default_headers(default_headers.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let auth = AuthClient::with_http(http.clone(), config.base_url())?;

        debug!(url = config.base_url(), "Created Supabase client");

        Ok(Self {
            http,
            config: Arc::new(config),
            default_headers: Arc::new(default_headers),
            auth,
        })
    }

    /// Create a client from `SUPABASE_URL` and `SUPABASE_KEY`.
    pub fn from_env() -> SupabaseResult<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    /// The project URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// The API key this client authenticates with.
    pub fn api_key(&self) -> &str {
        &self.config.supabase_key
    }

    /// Headers sent with every request.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// The transport timeout, if one was configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.config.timeout
    }

    /// The shared HTTP transport.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The auth facade sharing this client's transport.
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// Get the full config.
    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    /// Build a URL under the project, e.g. `rest_url("/rest/v1/users")`.
    pub fn rest_url(&self, path: &str) -> SupabaseResult<Url> {
        Ok(Url::parse(&format!("{}{}", self.base_url(), path))?)
    }
}

fn build_default_headers(config: &SupabaseConfig) -> SupabaseResult<HeaderMap> {
    let key = &config.supabase_key;
    let mut headers = HeaderMap::new();
    headers.insert(
        "apikey",
        HeaderValue::from_str(key)
            .map_err(|e| SupabaseError::config(format!("Invalid API key header: {}", e)))?,
    );
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", key))
            .map_err(|e| SupabaseError::config(format!("Invalid authorization header: {}", e)))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    // Extras are applied in order, later ones replacing earlier ones.
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SupabaseError::config(format!("Invalid header name {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| SupabaseError::config(format!("Invalid header value for {}: {}", name, e)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}
