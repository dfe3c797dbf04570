//! Embedding related tables with joins.
//!
//! Run with: SUPABASE_URL=... SUPABASE_KEY=... cargo run --example joins -p supabase-orm
//!
//! Expects `users`, `posts (user_id -> users.id)` and `comments (post_id -> posts.id)`.

use serde::Deserialize;
use supabase_orm::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Deserialize)]
struct Post {
    id: i64,
    title: String,
    #[serde(default)]
    comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
struct Comment {
    content: String,
}

#[derive(Debug, Deserialize)]
struct UserWithPosts {
    name: String,
    email: String,
    #[serde(default)]
    posts: Vec<Post>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = SupabaseClient::from_env()?;

    // select=id,name,email,created_at,posts(*)
    println!("=== Users with their posts ===");
    let users: Vec<UserWithPosts> = client
        .table("users")
        .select(["id", "name", "email", "created_at"])
        .inner_join("posts", "id", "user_id")
        .where_("email", "like", "%@example.com")
        .order("created_at", "desc")
        .limit(5)
        .get()
        .await?;
    for user in &users {
        println!("{} ({}): {} posts", user.name, user.email, user.posts.len());
        for post in &user.posts {
            println!("  - {}", post.title);
        }
    }

    // Posts with comments, keeping posts that have none (Prefer: missing=null)
    println!("\n=== Posts with comments ===");
    let posts: Vec<Post> = client
        .table("posts")
        .select(["id", "title"])
        .left_join("comments", "id", "post_id")
        .order("id", "asc")
        .range(0, 9)
        .get()
        .await?;
    for post in &posts {
        println!("#{} {}", post.id, post.title);
        for comment in &post.comments {
            println!("    > {}", comment.content);
        }
    }

    Ok(())
}
