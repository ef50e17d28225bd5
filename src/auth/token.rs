use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Refresh this long before the recorded expiry.
const REFRESH_GRACE_PERIOD_SECS: i64 = 60;

/// OAuth token payload stored in a token store.
///
/// # Example
/// ```no_run
/// use maestro::auth::Token;
/// use chrono::Utc;
///
/// let token = Token {
///     access_token: "access".to_string(),
///     refresh_token: Some("refresh".to_string()),
///     expires_at: None,
///     last_refresh: Some(Utc::now()),
///     scopes: Some(vec!["user-modify-playback-state".to_string()]),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_refresh: Option<DateTime<Utc>>,
    pub scopes: Option<Vec<String>>,
}

impl Token {
    /// Build a token from an `expires_in` lifetime in seconds.
    pub fn with_lifetime(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(|secs| now + Duration::seconds(secs)),
            last_refresh: Some(now),
            scopes: None,
        }
    }

    /// True when the token is expired or about to expire.
    pub fn needs_refresh(&self) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };
        Utc::now() >= expires_at - Duration::seconds(REFRESH_GRACE_PERIOD_SECS)
    }
}
