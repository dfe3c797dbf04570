/// Auth-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// HTTP transport error from reqwest (DNS, TCP, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The auth API answered with a status >= 400. `body` is the raw response text.
    #[error("auth error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Invalid configuration (bad URL or header bytes).
    #[error("Invalid auth configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl AuthError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
