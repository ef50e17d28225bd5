//! Routing through the coordinator to the specialist agents.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{app_token_body, spotify_client, track_json, InMemoryTokenStore, ScriptedProvider};
use maestro::agent::{Coordinator, CoordinatorOptions};
use maestro::tools::Invokable;
use maestro::types::Role;

fn coordinator(provider: Arc<ScriptedProvider>, server_uri: &str) -> Coordinator {
    let client = Arc::new(spotify_client(
        server_uri,
        Arc::new(InMemoryTokenStore::new()),
    ));
    Coordinator::new(provider, client, CoordinatorOptions::default()).unwrap()
}

#[test]
fn coordinator_exposes_one_delegate_per_specialist() {
    let coordinator = coordinator(Arc::new(ScriptedProvider::new()), "http://127.0.0.1:9");

    assert_eq!(
        coordinator.agent().tools().names(),
        vec!["call_search_agent", "call_playlist_agent", "call_playback_agent"]
    );
    assert_eq!(coordinator.name(), "Coordinator Agent");
    assert!(coordinator.search_agent().tools().contains("search_track"));
    assert!(coordinator.playlist_agent().tools().contains("get_playlist"));
    assert!(coordinator.playback_agent().tools().contains("play"));
    assert!(!coordinator.playback_agent().tools().contains("search_track"));
}

#[tokio::test]
async fn song_lookup_is_routed_to_the_search_agent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(app_token_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "Bohemian Rhapsody"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": {"items": [track_json("4u7EnebtmKWzUH433cf5Qv", "Bohemian Rhapsody", "Queen")], "total": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(ScriptedProvider::new());
    provider
        .queue_tool_call(
            "c1",
            "call_search_agent",
            json!({"task": "Find the song Bohemian Rhapsody"}),
        )
        .queue_tool_call("s1", "search_track", json!({"query": "Bohemian Rhapsody"}))
        .queue_text("Bohemian Rhapsody by Queen, from A Night at the Opera.")
        .queue_text("I found Bohemian Rhapsody by Queen.");

    let coordinator = coordinator(provider.clone(), &server.uri());
    let answer = coordinator.run("find Bohemian Rhapsody").await.unwrap();

    assert_eq!(answer, "I found Bohemian Rhapsody by Queen.");
    assert_eq!(provider.remaining(), 0);

    // The search agent saw the search result fed back to it.
    let search_history = coordinator.search_agent().history().await;
    let tool_message = search_history
        .iter()
        .find(|m| m.role == Role::Tool)
        .unwrap();
    let result = tool_message.tool_result_part().unwrap();
    assert!(!result.is_error);
    assert_eq!(result.result["tracks"][0]["artist"], "Queen");

    // The coordinator only saw the search agent's answer.
    let coordinator_history = coordinator.agent().history().await;
    let delegate_result = coordinator_history
        .iter()
        .find_map(|m| m.tool_result_part())
        .unwrap();
    assert_eq!(
        delegate_result.result,
        json!("Bohemian Rhapsody by Queen, from A Night at the Opera.")
    );
    // Only the system prompt.
    assert_eq!(coordinator.playback_agent().history().await.len(), 1);
}

#[tokio::test]
async fn playback_without_login_surfaces_the_login_hint() {
    let server = MockServer::start().await;

    let provider = Arc::new(ScriptedProvider::new());
    provider
        .queue_tool_call("c1", "call_playback_agent", json!({"task": "pause the music"}))
        .queue_tool_call("p1", "pause", json!({}))
        .queue_text("You need to log in first: run `maestro auth login`.")
        .queue_text("Please run `maestro auth login` so I can control playback.");

    let coordinator = coordinator(provider.clone(), &server.uri());
    let answer = coordinator.run("pause").await.unwrap();
    assert!(answer.contains("maestro auth login"));

    let playback_history = coordinator.playback_agent().history().await;
    let result = playback_history
        .iter()
        .find_map(|m| m.tool_result_part())
        .unwrap();
    assert!(result.is_error);
    assert!(result.content_text().contains("maestro auth login"));
}

#[tokio::test]
async fn clear_history_resets_every_agent() {
    let provider = Arc::new(ScriptedProvider::new());
    provider
        .queue_tool_call("c1", "call_playlist_agent", json!({"task": "hello"}))
        .queue_text("Playlist agent here.")
        .queue_text("Done.");

    let coordinator = coordinator(provider, "http://127.0.0.1:9");
    coordinator.run("say hi to the playlist agent").await.unwrap();
    assert_eq!(coordinator.playlist_agent().history().await.len(), 3);

    coordinator.clear_history().await;
    let history = coordinator.agent().history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, Role::System);
    assert_eq!(coordinator.playlist_agent().history().await.len(), 1);
}
