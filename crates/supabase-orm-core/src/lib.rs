pub mod client;
pub mod config;
pub mod error;
pub mod response;

pub use client::SupabaseClient;
pub use config::SupabaseConfig;
pub use error::{SupabaseError, SupabaseResult};
pub use response::{ContentRange, Response};
