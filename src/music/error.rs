use thiserror::Error;

use crate::auth::AuthError;

/// Closed set of failures a music-service operation can report.
///
/// Tool handlers surface these as text to the model, so every message is
/// phrased for a human reader.
#[derive(Debug, Error)]
pub enum MusicError {
    #[error(
        "Spotify user authorization required for playback. Run `maestro auth login` to authorize, then try again"
    )]
    AuthorizationRequired,
    #[error("Spotify rejected the credentials: {0}")]
    Unauthorized(String),
    #[error("Not found on Spotify: {0}")]
    NotFound(String),
    #[error("Spotify rate limit hit, retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("No active Spotify device. Open Spotify on a device and start playing, then try again")]
    NoActiveDevice,
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Spotify API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("Network error talking to Spotify: {0}")]
    Network(String),
}

impl From<reqwest::Error> for MusicError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<AuthError> for MusicError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::NotLoggedIn | AuthError::ExpiredOrInvalidGrant => Self::AuthorizationRequired,
            AuthError::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            AuthError::Network(msg) => Self::Network(msg),
            other => Self::Unauthorized(other.to_string()),
        }
    }
}
