//! Configuration (layered: code > env > `.env` file > defaults).

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{FileTokenStore, SpotifyAuth, SpotifyCredentials, TokenStoreConfig};
use crate::error::{MaestroError, Result};

pub const DEFAULT_MODEL: &str = "ollama:llama3.2";
pub const DEFAULT_MAX_ITERATIONS: usize = 8;
pub const DEFAULT_HISTORY_LIMIT: usize = 64;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_ACCOUNTS_URL: &str = crate::auth::spotify::DEFAULT_ACCOUNTS_URL;

/// Runtime configuration for the assistant.
///
/// Every Spotify variable accepts a `SPOTIFY_`-prefixed name and falls back
/// to the bare name (`CLIENT_ID`, `CLIENT_SECRET`, `REDIRECT_URI`).
#[derive(Clone)]
pub struct MaestroConfig {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub spotify_redirect_uri: Option<String>,
    pub spotify_api_url: String,
    pub spotify_accounts_url: String,
    /// Model selector, `provider:model`.
    pub model: String,
    pub ollama_base_url: String,
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
    pub max_iterations: usize,
    pub history_limit: usize,
    pub llm_timeout: Duration,
    pub http_timeout: Duration,
    pub token_dir: Option<PathBuf>,
}

impl fmt::Debug for MaestroConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaestroConfig")
            .field("spotify_client_id", &self.spotify_client_id)
            .field(
                "spotify_client_secret",
                &self.spotify_client_secret.as_ref().map(|_| ".."),
            )
            .field("spotify_redirect_uri", &self.spotify_redirect_uri)
            .field("spotify_api_url", &self.spotify_api_url)
            .field("spotify_accounts_url", &self.spotify_accounts_url)
            .field("model", &self.model)
            .field("ollama_base_url", &self.ollama_base_url)
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| ".."))
            .field("max_iterations", &self.max_iterations)
            .field("history_limit", &self.history_limit)
            .field("llm_timeout", &self.llm_timeout)
            .field("http_timeout", &self.http_timeout)
            .field("token_dir", &self.token_dir)
            .finish()
    }
}

impl Default for MaestroConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MaestroConfig {
    /// Defaults only, no environment lookup.
    pub fn new() -> Self {
        Self {
            spotify_client_id: None,
            spotify_client_secret: None,
            spotify_redirect_uri: None,
            spotify_api_url: DEFAULT_SPOTIFY_API_URL.to_string(),
            spotify_accounts_url: DEFAULT_SPOTIFY_ACCOUNTS_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_api_key: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            token_dir: None,
        }
    }

    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let mut config = Self::new();
        config.spotify_client_id = get(&["SPOTIFY_CLIENT_ID", "CLIENT_ID"]);
        config.spotify_client_secret = get(&["SPOTIFY_CLIENT_SECRET", "CLIENT_SECRET"]);
        config.spotify_redirect_uri = get(&["SPOTIFY_REDIRECT_URI", "REDIRECT_URI"]);
        config.openai_api_key = get(&["OPENAI_API_KEY"]);
        config.token_dir = get(&["MAESTRO_TOKEN_DIR"]).map(PathBuf::from);

        let url_mappings: [(&str, &mut String); 4] = [
            ("SPOTIFY_API_URL", &mut config.spotify_api_url),
            ("SPOTIFY_ACCOUNTS_URL", &mut config.spotify_accounts_url),
            ("OLLAMA_BASE_URL", &mut config.ollama_base_url),
            ("OPENAI_BASE_URL", &mut config.openai_base_url),
        ];
        for (env_var, slot) in url_mappings {
            if let Some(url) = get(&[env_var]) {
                *slot = url.trim_end_matches('/').to_string();
            }
        }

        if let Some(model) = get(&["MAESTRO_MODEL"]) {
            config.model = model;
        }
        if let Some(raw) = get(&["MAESTRO_MAX_ITERATIONS"]) {
            config.max_iterations = parse_number("MAESTRO_MAX_ITERATIONS", &raw)?;
        }
        if let Some(raw) = get(&["MAESTRO_HISTORY_LIMIT"]) {
            config.history_limit = parse_number("MAESTRO_HISTORY_LIMIT", &raw)?;
        }
        if let Some(raw) = get(&["MAESTRO_LLM_TIMEOUT_SECS"]) {
            config.llm_timeout = Duration::from_secs(parse_number("MAESTRO_LLM_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = get(&["MAESTRO_HTTP_TIMEOUT_SECS"]) {
            config.http_timeout =
                Duration::from_secs(parse_number("MAESTRO_HTTP_TIMEOUT_SECS", &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_spotify_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.spotify_client_id = Some(client_id.into());
        self.spotify_client_secret = Some(client_secret.into());
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.spotify_redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn with_spotify_urls(
        mut self,
        api_url: impl Into<String>,
        accounts_url: impl Into<String>,
    ) -> Self {
        self.spotify_api_url = api_url.into();
        self.spotify_accounts_url = accounts_url.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn with_timeouts(mut self, llm: Duration, http: Duration) -> Self {
        self.llm_timeout = llm;
        self.http_timeout = http;
        self
    }

    pub fn with_token_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.token_dir = Some(dir.into());
        self
    }

    /// Reject values that would make the dispatch loop meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(MaestroError::Configuration(
                "MAESTRO_MAX_ITERATIONS must be at least 1".into(),
            ));
        }
        if self.llm_timeout.is_zero() || self.http_timeout.is_zero() {
            return Err(MaestroError::Configuration(
                "timeouts must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Spotify application credentials. Missing id or secret is fatal.
    pub fn spotify_credentials(&self) -> Result<SpotifyCredentials> {
        let client_id = self.spotify_client_id.clone().ok_or_else(|| {
            MaestroError::Configuration(
                "SPOTIFY_CLIENT_ID (or CLIENT_ID) is not set".into(),
            )
        })?;
        let client_secret = self.spotify_client_secret.clone().ok_or_else(|| {
            MaestroError::Configuration(
                "SPOTIFY_CLIENT_SECRET (or CLIENT_SECRET) is not set".into(),
            )
        })?;
        Ok(SpotifyCredentials {
            client_id,
            client_secret: Some(client_secret),
            redirect_uri: self.spotify_redirect_uri.clone(),
        })
    }

    /// File-backed token store rooted at the configured directory.
    pub fn token_store(&self) -> FileTokenStore {
        match &self.token_dir {
            Some(dir) => FileTokenStore::new(TokenStoreConfig::new(dir.clone())),
            None => FileTokenStore::new_default(),
        }
    }

    /// Spotify credential manager wired to the configured token store,
    /// accounts URL and HTTP timeout.
    pub fn spotify_auth(&self) -> Result<SpotifyAuth> {
        let auth = SpotifyAuth::new(self.spotify_credentials()?, Arc::new(self.token_store()))
            .with_accounts_url(&self.spotify_accounts_url)
            .with_timeout(self.http_timeout)?;
        Ok(auth)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| MaestroError::Configuration(format!("{name} must be a number, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = MaestroConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_iterations, 8);
        assert_eq!(config.llm_timeout, Duration::from_secs(120));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.spotify_client_id.is_none());
    }

    #[test]
    fn bare_names_are_accepted_as_aliases() {
        let config = MaestroConfig::from_lookup(lookup(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "secret"),
            ("REDIRECT_URI", "http://127.0.0.1:8888/callback"),
        ]))
        .unwrap();
        assert_eq!(config.spotify_client_id.as_deref(), Some("id"));
        assert_eq!(config.spotify_client_secret.as_deref(), Some("secret"));
        assert_eq!(
            config.spotify_redirect_uri.as_deref(),
            Some("http://127.0.0.1:8888/callback")
        );
    }

    #[test]
    fn prefixed_names_win_over_aliases() {
        let config = MaestroConfig::from_lookup(lookup(&[
            ("CLIENT_ID", "bare"),
            ("SPOTIFY_CLIENT_ID", "prefixed"),
        ]))
        .unwrap();
        assert_eq!(config.spotify_client_id.as_deref(), Some("prefixed"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config =
            MaestroConfig::from_lookup(lookup(&[("SPOTIFY_CLIENT_ID", "  "), ("CLIENT_ID", "id")]))
                .unwrap();
        assert_eq!(config.spotify_client_id.as_deref(), Some("id"));
    }

    #[test]
    fn invalid_number_is_a_configuration_error() {
        let err = MaestroConfig::from_lookup(lookup(&[("MAESTRO_MAX_ITERATIONS", "lots")]))
            .unwrap_err();
        assert!(matches!(err, MaestroError::Configuration(msg) if msg.contains("MAESTRO_MAX_ITERATIONS")));
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let err =
            MaestroConfig::from_lookup(lookup(&[("MAESTRO_MAX_ITERATIONS", "0")])).unwrap_err();
        assert!(matches!(err, MaestroError::Configuration(_)));
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        let config = MaestroConfig::new();
        let config = MaestroConfig {
            spotify_client_id: Some("id".into()),
            ..config
        };
        assert!(matches!(
            config.spotify_credentials(),
            Err(MaestroError::Configuration(msg)) if msg.contains("CLIENT_SECRET")
        ));
    }

    #[test]
    fn base_urls_drop_trailing_slash() {
        let config =
            MaestroConfig::from_lookup(lookup(&[("OLLAMA_BASE_URL", "http://gpu-box:11434/")]))
                .unwrap();
        assert_eq!(config.ollama_base_url, "http://gpu-box:11434");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = MaestroConfig::new().with_spotify_credentials("id", "super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
