//! Spotify accounts flows and the file-backed token store.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{spotify_auth, user_token, InMemoryTokenStore};
use maestro::auth::spotify::{PLAYBACK_SCOPES, TOKEN_STORE_PROVIDER};
use maestro::auth::{
    AuthError, FileTokenStore, SpotifyAuth, SpotifyCredentials, Token, TokenStore,
    TokenStoreConfig,
};

#[tokio::test]
async fn client_credentials_use_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(header_exists("authorization"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::app_token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let auth = spotify_auth(&server.uri(), Arc::new(InMemoryTokenStore::new()));
    assert_eq!(auth.app_access_token().await.unwrap(), "app-token");
    assert_eq!(auth.app_access_token().await.unwrap(), "app-token");
}

#[tokio::test]
async fn bad_client_secret_is_invalid_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "Invalid client secret"
        })))
        .mount(&server)
        .await;

    let auth = spotify_auth(&server.uri(), Arc::new(InMemoryTokenStore::new()));
    let err = auth.app_access_token().await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidClient(msg) if msg == "Invalid client secret"));
}

#[test]
fn start_auth_builds_pkce_authorize_url() {
    let auth = spotify_auth("https://accounts.example", Arc::new(InMemoryTokenStore::new()));
    let session = auth.start_auth().unwrap();

    assert!(session
        .authorize_url
        .starts_with("https://accounts.example/authorize?"));
    assert!(session.authorize_url.contains("code_challenge_method=S256"));
    assert!(session.authorize_url.contains("client_id=client-id"));
    assert!(session.authorize_url.contains(&session.state));
    assert!(session.authorize_url.contains("user-modify-playback-state"));
    assert!(session.code_verifier.len() >= 43);
}

#[test]
fn start_auth_without_redirect_uri_fails() {
    let credentials = SpotifyCredentials {
        redirect_uri: None,
        ..common::credentials()
    };
    let auth = SpotifyAuth::new(credentials, Arc::new(InMemoryTokenStore::new()));
    assert!(matches!(auth.start_auth(), Err(AuthError::InvalidClient(_))));
}

#[tokio::test]
async fn exchange_code_stores_user_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains("code_verifier="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "user-access",
            "refresh_token": "user-refresh",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let auth = spotify_auth(&server.uri(), store.clone());
    let session = auth.start_auth().unwrap();
    let redirect = format!(
        "http://127.0.0.1:8888/callback?code=the-code&state={}",
        session.state
    );

    let token = auth.exchange_code(&session, &redirect).await.unwrap();
    assert_eq!(token.access_token, "user-access");

    let saved = store.get(TOKEN_STORE_PROVIDER, "default").unwrap();
    assert_eq!(saved.refresh_token.as_deref(), Some("user-refresh"));
    assert_eq!(saved.scopes.unwrap().len(), PLAYBACK_SCOPES.len());
    assert!(auth.logged_in().unwrap());
}

#[tokio::test]
async fn exchange_code_rejects_state_mismatch() {
    let store = Arc::new(InMemoryTokenStore::new());
    let auth = spotify_auth("http://127.0.0.1:9", store.clone());
    let session = auth.start_auth().unwrap();

    let err = auth
        .exchange_code(&session, "http://127.0.0.1:8888/callback?code=c&state=forged")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidResponse(msg) if msg.contains("state mismatch")));
    assert!(store.get(TOKEN_STORE_PROVIDER, "default").is_none());
}

#[tokio::test]
async fn exchange_code_requires_state_on_redirect_urls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "user-access",
            "expires_in": 3600
        })))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let auth = spotify_auth(&server.uri(), store.clone());
    let session = auth.start_auth().unwrap();

    let err = auth
        .exchange_code(&session, "http://127.0.0.1:8888/callback?code=c")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidResponse(msg) if msg.contains("state")));
    assert!(store.get(TOKEN_STORE_PROVIDER, "default").is_none());
}

#[tokio::test]
async fn accounts_calls_honor_the_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::app_token_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let auth = SpotifyAuth::new(common::credentials(), Arc::new(InMemoryTokenStore::new()))
        .with_accounts_url(server.uri())
        .with_timeout(Duration::from_millis(200))
        .unwrap();
    let err = auth.app_access_token().await.unwrap_err();
    assert!(matches!(err, AuthError::Network(_)));
}

#[tokio::test]
async fn user_token_is_returned_while_fresh() {
    let store = Arc::new(InMemoryTokenStore::new());
    store.seed(TOKEN_STORE_PROVIDER, "default", user_token("still-good"));
    let auth = spotify_auth("http://127.0.0.1:9", store);

    assert_eq!(auth.user_access_token().await.unwrap(), "still-good");
}

#[tokio::test]
async fn missing_user_token_is_not_logged_in() {
    let auth = spotify_auth("http://127.0.0.1:9", Arc::new(InMemoryTokenStore::new()));
    assert!(matches!(
        auth.user_access_token().await,
        Err(AuthError::NotLoggedIn)
    ));
}

#[tokio::test]
async fn rejected_refresh_clears_the_stored_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Refresh token revoked"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    store.seed(
        TOKEN_STORE_PROVIDER,
        "default",
        Token::with_lifetime("stale", Some("revoked".into()), Some(-10)),
    );
    let auth = spotify_auth(&server.uri(), store.clone());

    let err = auth.user_access_token().await.unwrap_err();
    assert!(matches!(err, AuthError::ExpiredOrInvalidGrant));
    assert!(store.get(TOKEN_STORE_PROVIDER, "default").is_none());
}

#[test]
fn file_store_round_trips_and_logout_deletes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(TokenStoreConfig::new(
        dir.path().to_path_buf(),
    )));
    let path = store.token_path(TOKEN_STORE_PROVIDER, "default");

    let auth = SpotifyAuth::new(common::credentials(), store.clone());
    store
        .save(TOKEN_STORE_PROVIDER, "default", &user_token("persisted"))
        .unwrap();
    assert!(path.exists());
    assert_eq!(
        auth.stored_user_token().unwrap().unwrap().access_token,
        "persisted"
    );

    auth.logout().unwrap();
    assert!(!path.exists());
    assert!(!auth.logged_in().unwrap());
    // Logging out twice is fine.
    auth.logout().unwrap();
}

#[cfg(unix)]
#[test]
fn token_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(TokenStoreConfig::new(dir.path().to_path_buf()));
    store
        .save(TOKEN_STORE_PROVIDER, "default", &user_token("secret"))
        .unwrap();

    let mode = std::fs::metadata(store.token_path(TOKEN_STORE_PROVIDER, "default"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}
