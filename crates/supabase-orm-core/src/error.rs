use supabase_orm_auth::AuthError;

/// All errors that can occur in the supabase-orm crates.
#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    /// Transport failure (DNS, TCP, TLS, timeout), surfaced verbatim.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a status >= 400. `body` is the raw response text.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The operation is not supported by the remote API.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// An HTTP method the dispatcher does not know how to send.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl SupabaseError {
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Auth(err) => err.status(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SupabaseError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias using SupabaseError.
pub type SupabaseResult<T> = Result<T, SupabaseError>;
