use std::time::Duration;

use crate::error::{SupabaseError, SupabaseResult};

/// Environment variable holding the project URL for [`SupabaseConfig::from_env`].
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
/// Environment variable holding the API key for [`SupabaseConfig::from_env`].
pub const SUPABASE_KEY_ENV: &str = "SUPABASE_KEY";

/// Configuration for connecting to a Supabase project.
///
/// Options are recorded in call order and applied on top of the client's
/// default headers when the client is built, so a later `header("apikey", ..)`
/// overrides the default one.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (e.g. "https://xyz.supabase.co")
    pub supabase_url: String,
    /// Supabase anon/service key
    pub supabase_key: String,
    /// Request timeout for the HTTP transport. `None` means no timeout.
    pub timeout: Option<Duration>,
    /// Extra default headers, in the order they were added.
    pub headers: Vec<(String, String)>,
}

impl SupabaseConfig {
    /// Create a new config from a project URL and API key.
    pub fn new(supabase_url: impl Into<String>, supabase_key: impl Into<String>) -> Self {
        Self {
            supabase_url: supabase_url.into(),
            supabase_key: supabase_key.into(),
            timeout: None,
            headers: Vec::new(),
        }
    }

    /// Read `SUPABASE_URL` and `SUPABASE_KEY` from the environment.
    pub fn from_env() -> SupabaseResult<Self> {
        let url = std::env::var(SUPABASE_URL_ENV)
            .map_err(|_| SupabaseError::config(format!("{} is not set", SUPABASE_URL_ENV)))?;
        let key = std::env::var(SUPABASE_KEY_ENV)
            .map_err(|_| SupabaseError::config(format!("{} is not set", SUPABASE_KEY_ENV)))?;
        Ok(Self::new(url, key))
    }

    /// Set the HTTP transport timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add one default header sent with every request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Add several default headers sent with every request.
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// The project URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.supabase_url.trim_end_matches('/')
    }
}
