//! CLI auth command handlers for login, status, and logout.

use std::io::Write;

use crate::auth::SpotifyAuth;
use crate::config::MaestroConfig;
use crate::error::{MaestroError, Result};

/// Handle `maestro auth login`.
pub async fn handle_login(config: &MaestroConfig, open_browser: bool) -> Result<()> {
    let auth = config.spotify_auth()?;
    let session = auth.start_auth()?;

    println!("🔗 Visit: {}", session.authorize_url);
    if open_browser && webbrowser::open(&session.authorize_url).is_err() {
        println!("   (could not open a browser, copy the link above)");
    }
    println!("📋 After approving, paste the URL you were redirected to:");
    print!("> ");
    std::io::stdout().flush()?;

    let mut response = String::new();
    std::io::stdin().read_line(&mut response)?;
    let response = response.trim();
    if response.is_empty() {
        return Err(MaestroError::InvalidArgument(
            "no redirect URL provided".into(),
        ));
    }

    let token = auth.exchange_code(&session, response).await?;
    println!("✅ Spotify login successful!");
    if let Some(expires) = token.expires_at {
        println!("   Token refreshes automatically after {}", expires.format("%H:%M"));
    }
    Ok(())
}

/// Handle `maestro auth status`.
pub async fn handle_status(config: &MaestroConfig) -> Result<()> {
    println!("🔐 Spotify Authorization\n");

    match config.spotify_auth() {
        Ok(auth) => println!("  User token: {}", token_status(&auth)),
        Err(e) => println!("  User token: ⚠️  {e}"),
    }

    println!("\n📌 Environment Variables:");
    for (name, set) in [
        ("SPOTIFY_CLIENT_ID", config.spotify_client_id.is_some()),
        ("SPOTIFY_CLIENT_SECRET", config.spotify_client_secret.is_some()),
        ("SPOTIFY_REDIRECT_URI", config.spotify_redirect_uri.is_some()),
        ("OPENAI_API_KEY", config.openai_api_key.is_some()),
    ] {
        let status = if set { "✅ Set" } else { "❌ Not set" };
        println!("  {name}: {status}");
    }
    println!("\n🤖 Model: {}", config.model);

    Ok(())
}

/// Handle `maestro auth logout`.
pub async fn handle_logout(config: &MaestroConfig) -> Result<()> {
    config.spotify_auth()?.logout()?;
    println!("✅ Logged out from Spotify");
    Ok(())
}

fn token_status(auth: &SpotifyAuth) -> String {
    match auth.stored_user_token() {
        Ok(Some(token)) => match token.expires_at {
            Some(expires) if expires > chrono::Utc::now() => {
                format!("✅ Logged in (expires {})", expires.format("%Y-%m-%d %H:%M"))
            }
            Some(_) => "⚠️  Token expired (refreshes on next use)".to_string(),
            None => "✅ Logged in".to_string(),
        },
        Ok(None) => "❌ Not logged in. Run: maestro auth login".to_string(),
        Err(e) => format!("⚠️  Error: {e}"),
    }
}
