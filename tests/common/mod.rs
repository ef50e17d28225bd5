//! Shared test helpers: scripted model provider, in-memory token store,
//! and Spotify fixtures.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use maestro::auth::{AuthError, SpotifyAuth, SpotifyCredentials, Token, TokenStore};
use maestro::error::MaestroError;
use maestro::music::SpotifyClient;
use maestro::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use maestro::types::{AgentToolCall, Usage};

/// A provider that replays queued responses in order and records every
/// request it receives.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ProviderResponse, MaestroError>>>,
    fallback: Option<ProviderResponse>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Response used once the queue is empty.
    pub fn with_fallback(mut self, response: ProviderResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    /// Queue a final text answer.
    pub fn queue_text(&self, text: &str) -> &Self {
        let mut response = ProviderResponse::text(text);
        response.usage = Usage::new(10, 20);
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a single tool call.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: Value) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(ProviderResponse::tool_calls(vec![tool_call(id, name, args)])));
        self
    }

    /// Queue an arbitrary response.
    pub fn queue_response(&self, response: ProviderResponse) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a failure.
    pub fn queue_error(&self, err: MaestroError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, MaestroError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => match &self.fallback {
                Some(response) => Ok(response.clone()),
                None => Err(MaestroError::Backend {
                    status: 500,
                    message: "script exhausted".into(),
                }),
            },
        }
    }
}

pub fn tool_call(id: &str, name: &str, args: Value) -> AgentToolCall {
    AgentToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: args,
    }
}

/// Token store kept in memory.
#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: Mutex<HashMap<(String, String), Token>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, provider: &str, profile: &str, token: Token) {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .insert((provider.to_string(), profile.to_string()), token);
    }

    pub fn get(&self, provider: &str, profile: &str) -> Option<Token> {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .get(&(provider.to_string(), profile.to_string()))
            .cloned()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self, provider: &str, profile: &str) -> Result<Option<Token>, AuthError> {
        Ok(self.get(provider, profile))
    }

    fn save(&self, provider: &str, profile: &str, token: &Token) -> Result<(), AuthError> {
        self.seed(provider, profile, token.clone());
        Ok(())
    }

    fn clear(&self, provider: &str, profile: &str) -> Result<(), AuthError> {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .remove(&(provider.to_string(), profile.to_string()));
        Ok(())
    }
}

pub fn credentials() -> SpotifyCredentials {
    SpotifyCredentials {
        client_id: "client-id".to_string(),
        client_secret: Some("client-secret".to_string()),
        redirect_uri: Some("http://127.0.0.1:8888/callback".to_string()),
    }
}

/// Auth manager whose accounts service is the mock server.
pub fn spotify_auth(accounts_url: &str, store: Arc<dyn TokenStore>) -> SpotifyAuth {
    SpotifyAuth::new(credentials(), store)
        .with_accounts_url(accounts_url)
        .with_timeout(Duration::from_secs(5))
        .unwrap()
}

/// Client with both the API and accounts service on the mock server.
pub fn spotify_client(server_uri: &str, store: Arc<dyn TokenStore>) -> SpotifyClient {
    SpotifyClient::new(Arc::new(spotify_auth(server_uri, store)), Duration::from_secs(5))
        .unwrap()
        .with_api_url(format!("{server_uri}/v1"))
}

pub fn app_token_body() -> Value {
    json!({
        "access_token": "app-token",
        "token_type": "Bearer",
        "expires_in": 3600
    })
}

pub fn user_token(access_token: &str) -> Token {
    Token::with_lifetime(access_token, Some("refresh-1".to_string()), Some(3600))
}

pub fn track_json(id: &str, name: &str, artist: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "artists": [{"name": artist}],
        "album": {"name": "A Night at the Opera"},
        "duration_ms": 354_000,
        "popularity": 90,
        "uri": format!("spotify:track:{id}")
    })
}
