//! Raw SQL through the `execute_sql` RPC.
//!
//! Run with: SUPABASE_URL=... SUPABASE_KEY=... cargo run --example raw_sql -p supabase-orm
//!
//! The database needs a function that runs its `query` argument and returns
//! the rows as JSON, e.g.:
//!
//! ```sql
//! CREATE FUNCTION execute_sql(query text) RETURNS SETOF json
//! LANGUAGE plpgsql SECURITY DEFINER AS $$
//! BEGIN
//!   RETURN QUERY EXECUTE format('SELECT row_to_json(t) FROM (%s) t', query);
//! END $$;
//! ```
//!
//! The SQL text is sent as is. Never build it from untrusted input.

use serde::Deserialize;
use supabase_orm::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Deserialize)]
struct PostCount {
    name: String,
    post_count: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = SupabaseClient::from_env()?;

    println!("=== Post counts by user ===");
    let counts: Vec<PostCount> = client
        .table("")
        .raw(
            "SELECT u.name, COUNT(p.id) AS post_count \
             FROM users u LEFT JOIN posts p ON p.user_id = u.id \
             GROUP BY u.name ORDER BY post_count DESC",
        )
        .get()
        .await?;
    for row in &counts {
        println!("  {}: {}", row.name, row.post_count);
    }

    println!("\n=== Monthly signups ===");
    let months: Vec<serde_json::Value> = client
        .table("")
        .raw(
            "SELECT date_trunc('month', created_at) AS month, COUNT(*) AS signups \
             FROM users GROUP BY 1 ORDER BY 1",
        )
        .get()
        .await?;
    for month in &months {
        println!("  {} -> {}", month["month"], month["signups"]);
    }

    Ok(())
}
