//! Fluent PostgREST query builder and Supabase Auth client.
//!
//! ```ignore
//! use supabase_orm::prelude::*;
//!
//! let client = SupabaseClient::new(SupabaseConfig::from_env()?)?;
//!
//! let users: Vec<serde_json::Value> = client
//!     .table("users")
//!     .select(["id", "name"])
//!     .where_("age", ">", 18)
//!     .get()
//!     .await?;
//!
//! let session = client
//!     .auth()
//!     .sign_in_with_password(&SignInRequest::password("user@example.com", "password"))
//!     .await?;
//! ```

// Re-export core (always available)
pub use supabase_orm_core::*;

// Re-export query builder (feature-gated)
#[cfg(feature = "query")]
pub use supabase_orm_query::*;

// Re-export auth crate
#[cfg(feature = "auth")]
pub use supabase_orm_auth;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use supabase_orm::prelude::*;
/// ```
pub mod prelude {
    pub use supabase_orm_core::{
        ContentRange, Response, SupabaseClient, SupabaseConfig, SupabaseError, SupabaseResult,
    };

    #[cfg(feature = "query")]
    pub use supabase_orm_query::{
        FilterGroup, FilterValue, QueryBuilder, SupabaseClientQueryExt, Transaction,
    };

    #[cfg(feature = "auth")]
    pub use supabase_orm_auth::{
        AuthClient, AuthError, AuthResponse, OtpType, RefreshTokenRequest,
        ResetPasswordRequest, SignInRequest, SignUpRequest, UpdatePasswordRequest, User,
        VerifyRequest,
    };
}
