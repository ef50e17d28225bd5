//! Spotify accounts service: app-level and user-level credentials.
//!
//! Catalog reads use a client-credentials token that lives only in memory.
//! Playback needs a user token obtained through the PKCE authorization-code
//! flow; that token is persisted in a [`TokenStore`] and refreshed on demand.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Url;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::store::TokenStore;
use super::token::Token;

pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const TOKEN_STORE_PROVIDER: &str = "spotify";
pub const PLAYBACK_SCOPES: &[&str] = &[
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
];

/// Application credentials registered with Spotify.
#[derive(Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| ".."))
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// PKCE authorization session returned by [`SpotifyAuth::start_auth`].
///
/// The caller opens `authorize_url` in a browser and passes the URL the
/// browser was redirected to back into [`SpotifyAuth::exchange_code`].
#[derive(Debug, Clone)]
pub struct PkceSession {
    pub authorize_url: String,
    pub state: String,
    pub code_verifier: String,
}

/// Credential manager for the Spotify accounts service.
pub struct SpotifyAuth {
    credentials: SpotifyCredentials,
    accounts_url: String,
    client: reqwest::Client,
    token_store: Arc<dyn TokenStore>,
    profile: String,
    app_token: Mutex<Option<Token>>,
}

impl SpotifyAuth {
    pub fn new(credentials: SpotifyCredentials, token_store: Arc<dyn TokenStore>) -> Self {
        Self {
            credentials,
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            client: reqwest::Client::new(),
            token_store,
            profile: "default".to_string(),
            app_token: Mutex::new(None),
        }
    }

    pub fn with_accounts_url(mut self, url: impl Into<String>) -> Self {
        self.accounts_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Apply a request timeout to every accounts-service call.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, AuthError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    pub fn credentials(&self) -> &SpotifyCredentials {
        &self.credentials
    }

    fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_url)
    }

    /// App-level access token for catalog reads, fetched on first use.
    pub async fn app_access_token(&self) -> Result<String, AuthError> {
        let mut cached = self.app_token.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.needs_refresh() {
                return Ok(token.access_token.clone());
            }
        }

        let secret = self.credentials.client_secret.as_deref().ok_or_else(|| {
            AuthError::InvalidClient("client secret is required for catalog access".into())
        })?;

        debug!("requesting client-credentials token");
        let resp = self
            .client
            .post(self.token_url())
            .basic_auth(&self.credentials.client_id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let token = token_from_response(resp).await?;
        let access = token.access_token.clone();
        *cached = Some(token);
        Ok(access)
    }

    /// Whether a user token is stored.
    pub fn logged_in(&self) -> Result<bool, AuthError> {
        Ok(self
            .token_store
            .load(TOKEN_STORE_PROVIDER, &self.profile)?
            .is_some())
    }

    /// Stored user token, if any, without refreshing it.
    pub fn stored_user_token(&self) -> Result<Option<Token>, AuthError> {
        self.token_store.load(TOKEN_STORE_PROVIDER, &self.profile)
    }

    /// User-authorized access token for playback, refreshed when stale.
    pub async fn user_access_token(&self) -> Result<String, AuthError> {
        let token = self
            .token_store
            .load(TOKEN_STORE_PROVIDER, &self.profile)?
            .ok_or(AuthError::NotLoggedIn)?;

        if !token.needs_refresh() {
            return Ok(token.access_token);
        }

        match self.refresh_token(&token).await {
            Ok(refreshed) => Ok(refreshed.access_token),
            Err(AuthError::ExpiredOrInvalidGrant) => {
                warn!("stored Spotify refresh token was rejected, clearing it");
                self.token_store.clear(TOKEN_STORE_PROVIDER, &self.profile)?;
                Err(AuthError::ExpiredOrInvalidGrant)
            }
            Err(err) => Err(err),
        }
    }

    /// Begin an interactive PKCE authorization flow.
    pub fn start_auth(&self) -> Result<PkceSession, AuthError> {
        let redirect_uri = self.redirect_uri()?;
        let state = random_hex(16);
        let code_verifier = generate_code_verifier();
        let code_challenge = compute_code_challenge(&code_verifier);
        let scope = PLAYBACK_SCOPES.join(" ");

        let authorize_url = Url::parse_with_params(
            &format!("{}/authorize", self.accounts_url),
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", redirect_uri),
                ("scope", scope.as_str()),
                ("state", state.as_str()),
                ("code_challenge_method", "S256"),
                ("code_challenge", code_challenge.as_str()),
            ],
        )
        .map_err(|e| AuthError::InvalidResponse(format!("invalid accounts URL: {e}")))?;

        Ok(PkceSession {
            authorize_url: authorize_url.to_string(),
            state,
            code_verifier,
        })
    }

    /// Exchange the authorization response for a user token and persist it.
    ///
    /// `auth_response` may be the full redirect URL, `"code#state"`, or the
    /// bare code. A redirect URL must carry a `state`, and any state given
    /// must match the session.
    pub async fn exchange_code(
        &self,
        session: &PkceSession,
        auth_response: &str,
    ) -> Result<Token, AuthError> {
        let redirect_uri = self.redirect_uri()?;
        let (code, state) = parse_auth_response(auth_response)?;
        if let Some(returned_state) = state.as_deref() {
            if returned_state != session.state {
                return Err(AuthError::InvalidResponse(format!(
                    "OAuth state mismatch: expected {}, got {returned_state}",
                    session.state
                )));
            }
        }

        let resp = self
            .client
            .post(self.token_url())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("redirect_uri", redirect_uri),
                ("client_id", self.credentials.client_id.as_str()),
                ("code_verifier", session.code_verifier.as_str()),
            ])
            .send()
            .await?;

        let mut token = token_from_response(resp).await?;
        token.scopes = Some(PLAYBACK_SCOPES.iter().map(|s| s.to_string()).collect());
        self.token_store
            .save(TOKEN_STORE_PROVIDER, &self.profile, &token)?;
        info!("stored Spotify user token");
        Ok(token)
    }

    /// Refresh a user token and persist the result.
    pub async fn refresh_token(&self, token: &Token) -> Result<Token, AuthError> {
        let refresh_token = token
            .refresh_token
            .as_ref()
            .ok_or(AuthError::ExpiredOrInvalidGrant)?;

        debug!("refreshing Spotify user token");
        let resp = self
            .client
            .post(self.token_url())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.credentials.client_id.as_str()),
            ])
            .send()
            .await?;

        let mut refreshed = token_from_response(resp).await?;
        // Spotify may omit the refresh token when it is unchanged.
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = token.refresh_token.clone();
        }
        refreshed.scopes = token.scopes.clone();
        self.token_store
            .save(TOKEN_STORE_PROVIDER, &self.profile, &refreshed)?;
        Ok(refreshed)
    }

    /// Delete the cached user token, forcing re-authorization.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.token_store.clear(TOKEN_STORE_PROVIDER, &self.profile)
    }

    fn redirect_uri(&self) -> Result<&str, AuthError> {
        self.credentials
            .redirect_uri
            .as_deref()
            .ok_or_else(|| AuthError::InvalidClient("SPOTIFY_REDIRECT_URI is not set".into()))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

async fn token_from_response(resp: reqwest::Response) -> Result<Token, AuthError> {
    let status = resp.status();
    if status.is_success() {
        let payload: TokenResponse = resp.json().await?;
        return Ok(Token::with_lifetime(
            payload.access_token,
            payload.refresh_token,
            payload.expires_in,
        ));
    }

    if status.as_u16() == 429 {
        let retry_after_secs = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return Err(AuthError::RateLimited { retry_after_secs });
    }

    let body = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<TokenErrorResponse>(&body) {
        Ok(err) if err.error == "invalid_grant" => Err(AuthError::ExpiredOrInvalidGrant),
        Ok(err) if err.error == "invalid_client" => Err(AuthError::InvalidClient(
            err.error_description.unwrap_or(err.error),
        )),
        Ok(err) => Err(AuthError::InvalidResponse(format!(
            "token request failed with status {status}: {}",
            err.error_description.unwrap_or(err.error)
        ))),
        Err(_) => Err(AuthError::InvalidResponse(format!(
            "token request failed with status {status}"
        ))),
    }
}

fn parse_auth_response(input: &str) -> Result<(String, Option<String>), AuthError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AuthError::InvalidResponse("empty authorization response".into()));
    }

    if let Ok(url) = Url::parse(input) {
        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => {
                    return Err(AuthError::InvalidResponse(format!(
                        "authorization was not granted: {value}"
                    )))
                }
                _ => {}
            }
        }
        let code = code.ok_or_else(|| {
            AuthError::InvalidResponse("redirect URL has no `code` parameter".into())
        })?;
        let state = state.ok_or_else(|| {
            AuthError::InvalidResponse("redirect URL has no `state` parameter".into())
        })?;
        return Ok((code, Some(state)));
    }

    Ok(match input.split_once('#') {
        Some((code, state)) => (code.to_string(), Some(state.to_string())),
        None => (input.to_string(), None),
    })
}

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    for chunk in buf.chunks_mut(16) {
        let id = uuid::Uuid::new_v4();
        let len = chunk.len();
        chunk.copy_from_slice(&id.as_bytes()[..len]);
    }
    buf
}

fn random_hex(byte_count: usize) -> String {
    let mut out = String::with_capacity(byte_count * 2);
    while out.len() < byte_count * 2 {
        out.push_str(&uuid::Uuid::new_v4().simple().to_string());
    }
    out.truncate(byte_count * 2);
    out
}

fn generate_code_verifier() -> String {
    URL_SAFE_NO_PAD.encode(random_bytes::<48>())
}

fn compute_code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}
