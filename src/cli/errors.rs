//! User-facing error messages with actionable guidance.

use crate::auth::AuthError;
use crate::error::MaestroError;
use crate::music::MusicError;

/// Map a [`MaestroError`] to a help string the shell can print.
pub fn format_error_help(err: &MaestroError) -> String {
    match err {
        MaestroError::Configuration(msg) => {
            format!("Configuration error: {msg}. Check your environment or .env file.")
        }
        MaestroError::BackendUnavailable(msg) => {
            format!("The language model is not reachable ({msg}). Make sure it is running and try again.")
        }
        MaestroError::Backend { status, message } => {
            format!("The language model returned an error (status {status}): {message}")
        }
        MaestroError::Music(MusicError::AuthorizationRequired)
        | MaestroError::Auth(AuthError::NotLoggedIn | AuthError::ExpiredOrInvalidGrant) => {
            "Spotify authorization is required. Run: maestro auth login".to_string()
        }
        MaestroError::Music(MusicError::Unauthorized(msg)) | MaestroError::Auth(AuthError::InvalidClient(msg)) => {
            format!("Spotify rejected the credentials: {msg}. Check SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET.")
        }
        MaestroError::AgentBusy(name) => {
            format!("The {name} is still busy with an earlier request. Try again in a moment.")
        }
        other => format!("{other}"),
    }
}
