//! Basic CRUD with the query builder.
//!
//! Run with: SUPABASE_URL=... SUPABASE_KEY=... cargo run --example query_basics -p supabase-orm
//!
//! Expects a `users` table with `id`, `name`, `email`, `age` and `created_at`.
//! Set `RUST_LOG=supabase_orm_query=debug` to see the requests.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use supabase_orm::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Serialize, Deserialize)]
struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    name: String,
    email: String,
    age: i32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SupabaseConfig::from_env()?
        .timeout(Duration::from_secs(10))
        .header("X-Client-Info", "supabase-orm-demo");
    let client = SupabaseClient::new(config)?;

    // ── SELECT with filters, ordering and paging ──
    println!("=== Adults, oldest first ===");
    let users: Vec<User> = client
        .table("users")
        .select(["id", "name", "email", "age"])
        .where_("age", ">=", 18)
        .order("age", "desc")
        .limit(10)
        .get()
        .await?;
    for user in &users {
        println!("  {} <{}> ({})", user.name, user.email, user.age);
    }

    // ── INSERT, echoing the stored row ──
    println!("\n=== Insert ===");
    let created = client
        .table("users")
        .header("Prefer", "return=representation")
        .insert(User {
            id: None,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            age: 36,
        })
        .await?;
    println!("  created id {:?}", created.id);

    // ── UPDATE ──
    client
        .table("users")
        .where_("email", "=", "ada@example.com")
        .update(&json!({"age": 37}))
        .await?;

    // ── OR across filters ──
    println!("\n=== Ada or minors ===");
    let matched: Vec<User> = client
        .table("users")
        .or_group(|g| g.eq("name", "Ada").where_("age", "<", 18))
        .get()
        .await?;
    println!("  {} rows", matched.len());

    // ── COUNT ──
    let total = client.table("users").count().await?;
    println!("\n=== {} users in total ===", total);

    // ── DELETE ──
    client
        .table("users")
        .where_("email", "=", "ada@example.com")
        .delete()
        .await?;

    // ── Transaction header ──
    let tx = client.begin();
    tx.table("users")
        .where_("age", "<", 0)
        .delete()
        .await?;
    tx.commit()?;

    Ok(())
}
