use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Response of sign-up, password sign-in, verify and token refresh.
///
/// `expires_at` is not part of the wire format. It is computed client-side
/// right after decoding, from whatever `expires_in` the server returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(skip)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthResponse {
    /// Set `expires_at` to `now + expires_in` seconds.
    ///
    /// Out-of-range values leave `expires_at` unset.
    pub fn with_expiry_from(mut self, now: DateTime<Utc>) -> Self {
        self.expires_at = TimeDelta::try_seconds(self.expires_in)
            .and_then(|delta| now.checked_add_signed(delta));
        self
    }

    /// Whether the access token has expired relative to `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// A GoTrue user object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub app_metadata: Option<JsonValue>,
    #[serde(default)]
    pub user_metadata: Option<JsonValue>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// OTP verification type sent to `/verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpType {
    #[serde(rename = "magiclink")]
    MagicLink,
    Sms,
    Recovery,
    Signup,
    Email,
}

impl fmt::Display for OtpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MagicLink => write!(f, "magiclink"),
            Self::Sms => write!(f, "sms"),
            Self::Recovery => write!(f, "recovery"),
            Self::Signup => write!(f, "signup"),
            Self::Email => write!(f, "email"),
        }
    }
}
