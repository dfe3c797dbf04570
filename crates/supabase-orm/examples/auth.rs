//! Authentication flows: sign-up, sign-in, user lookup, refresh and sign-out.
//!
//! Run with: SUPABASE_URL=... SUPABASE_KEY=<anon key> cargo run --example auth -p supabase-orm

use supabase_orm::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = SupabaseClient::from_env()?;
    let auth = client.auth();

    let email = std::env::var("DEMO_EMAIL").unwrap_or_else(|_| "demo-user@example.com".into());
    let password = "demo-password-123";

    // Sign up; an already registered user is not fatal for the demo
    match auth
        .sign_up(&SignUpRequest::new(&email, password)
            .user_metadata(serde_json::json!({"full_name": "Demo User"})))
        .await
    {
        Ok(session) => println!("signed up, token expires at {:?}", session.expires_at),
        Err(AuthError::Api { status, body }) => println!("sign up rejected ({}): {}", status, body),
        Err(e) => return Err(e.into()),
    }

    let session = auth
        .sign_in_with_password(&SignInRequest::password(&email, password))
        .await?;
    println!(
        "signed in as {:?}, expires at {:?}",
        session.user.as_ref().and_then(|u| u.email.clone()),
        session.expires_at
    );

    let user = auth.get_user(&session.access_token).await?;
    println!("user id {}", user.id);

    let refreshed = auth
        .refresh_token(&RefreshTokenRequest {
            refresh_token: session.refresh_token.clone(),
        })
        .await?;
    println!("refreshed, new expiry {:?}", refreshed.expires_at);

    // Magic link and OTP verification
    auth.sign_in_with_otp(&SignInRequest::otp(&email)).await?;
    if let Ok(code) = std::env::var("DEMO_OTP") {
        let verified = auth
            .verify(&VerifyRequest::new(&email, code, OtpType::MagicLink))
            .await?;
        println!("verified, expires at {:?}", verified.expires_at);
    }

    auth.reset_password(&ResetPasswordRequest { email: email.clone() }).await?;

    auth.sign_out(&refreshed.access_token).await?;
    println!("signed out");

    Ok(())
}
