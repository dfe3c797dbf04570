//! Supabase Auth (GoTrue) HTTP calls.
//!
//! Every operation is one fixed HTTP call under `/auth/v1/...` with a JSON
//! body and a typed JSON response. Sessions returned by sign-up, password
//! sign-in, verify and refresh carry a client-computed `expires_at`.
//!
//! # Usage
//!
//! ```ignore
//! use supabase_orm::prelude::*;
//!
//! let client = SupabaseClient::new(SupabaseConfig::new(url, key))?;
//! let auth = client.auth();
//!
//! auth.sign_up(&SignUpRequest::new("user@example.com", "password123")).await?;
//! let session = auth
//!     .sign_in_with_password(&SignInRequest::password("user@example.com", "password123"))
//!     .await?;
//! let user = auth.get_user(&session.access_token).await?;
//! auth.sign_out(&session.access_token).await?;
//! ```

pub mod client;
pub mod error;
pub mod params;
pub mod types;

pub use client::AuthClient;
pub use error::AuthError;
pub use params::*;
pub use types::*;
