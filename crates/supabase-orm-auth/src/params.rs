use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::types::OtpType;

/// Body of `POST /signup`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Custom user metadata, sent as `data`.
    #[serde(rename = "data", default, skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<JsonValue>,
}

impl SignUpRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Attach user metadata.
    pub fn user_metadata(mut self, data: JsonValue) -> Self {
        self.user_metadata = Some(data);
        self
    }
}

/// Body of `POST /token?grant_type=password` and `POST /otp`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub create_user: bool,
}

impl SignInRequest {
    /// Email + password sign-in.
    pub fn password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Some(password.into()),
            ..Default::default()
        }
    }

    /// Magic link / OTP sign-in by email.
    pub fn otp(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    /// Let the OTP endpoint create the user if it does not exist yet.
    pub fn create_user(mut self, create: bool) -> Self {
        self.create_user = create;
        self
    }
}

/// Body of `POST /verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub token: String,
    #[serde(rename = "type")]
    pub otp_type: OtpType,
}

impl VerifyRequest {
    pub fn new(email: impl Into<String>, token: impl Into<String>, otp_type: OtpType) -> Self {
        Self {
            email: email.into(),
            token: token.into(),
            otp_type,
        }
    }
}

/// Body of `POST /recover`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// Body of `PUT /user` for a password change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

/// Body of `POST /token?grant_type=refresh_token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}
