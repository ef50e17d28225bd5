//! Music operations exposed as agent tools.

use std::sync::Arc;

use serde_json::json;

use crate::error::MaestroError;
use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments};

use super::client::{context_uri, to_uri, SpotifyClient, SpotifyKind, MAX_RECOMMENDATION_SEEDS};
use super::types::PlayRequest;

const DEFAULT_RESULT_LIMIT: u64 = 5;

fn limit_arg(args: &ToolArguments) -> Result<u32, MaestroError> {
    let limit = args.get_u64_opt("limit")?.unwrap_or(DEFAULT_RESULT_LIMIT);
    Ok(limit.min(u32::MAX as u64) as u32)
}

/// Catalog tools for the search agent.
pub fn search_tools(client: Arc<SpotifyClient>) -> Vec<Arc<dyn Tool>> {
    let search_track = {
        let client = client.clone();
        AgentTool::new(
            "search_track",
            "Search for tracks on Spotify by query string",
            AgentToolParameters::object()
                .string("query", "Search query (song name, artist, album, etc.)", true)
                .integer("limit", "Number of results to return (default 5)", false)
                .build(),
            move |args, _ctx| {
                let client = client.clone();
                async move {
                    let tracks = client
                        .search_tracks(args.get_str("query")?, limit_arg(&args)?)
                        .await?;
                    Ok(json!({ "tracks": tracks }))
                }
            },
        )
    };

    let search_artist = {
        let client = client.clone();
        AgentTool::new(
            "search_artist",
            "Search for artists on Spotify by name",
            AgentToolParameters::object()
                .string("query", "Artist name to search for", true)
                .integer("limit", "Number of results to return (default 5)", false)
                .build(),
            move |args, _ctx| {
                let client = client.clone();
                async move {
                    let artists = client
                        .search_artists(args.get_str("query")?, limit_arg(&args)?)
                        .await?;
                    Ok(json!({ "artists": artists }))
                }
            },
        )
    };

    let get_track_info = {
        let client = client.clone();
        AgentTool::new(
            "get_track_info",
            "Get detailed information about a specific track by ID",
            AgentToolParameters::object()
                .string("track_id", "Spotify track ID, URI or link", true)
                .build(),
            move |args, _ctx| {
                let client = client.clone();
                async move {
                    let track = client.get_track(args.get_str("track_id")?).await?;
                    Ok(serde_json::to_value(track)?)
                }
            },
        )
    };

    let get_artist_info = {
        let client = client.clone();
        AgentTool::new(
            "get_artist_info",
            "Get detailed information about an artist by ID",
            AgentToolParameters::object()
                .string("artist_id", "Spotify artist ID, URI or link", true)
                .build(),
            move |args, _ctx| {
                let client = client.clone();
                async move {
                    let artist = client.get_artist(args.get_str("artist_id")?).await?;
                    Ok(serde_json::to_value(artist)?)
                }
            },
        )
    };

    let get_artist_top_tracks = {
        let client = client.clone();
        AgentTool::new(
            "get_artist_top_tracks",
            "Get an artist's most popular tracks by artist ID",
            AgentToolParameters::object()
                .string("artist_id", "Spotify artist ID, URI or link", true)
                .string("market", "Two-letter country code (default US)", false)
                .build(),
            move |args, _ctx| {
                let client = client.clone();
                async move {
                    let tracks = client
                        .get_artist_top_tracks(args.get_str("artist_id")?, args.get_str_opt("market"))
                        .await?;
                    Ok(json!({ "tracks": tracks }))
                }
            },
        )
    };

    let get_recommendations = AgentTool::new(
        "get_recommendations",
        "Get track recommendations based on seed track IDs",
        AgentToolParameters::object()
            .string_array(
                "seed_tracks",
                format!("List of track IDs to base recommendations on (max {MAX_RECOMMENDATION_SEEDS})"),
                true,
            )
            .integer("limit", "Number of recommendations to return (default 5)", false)
            .build(),
        move |args, _ctx| {
            let client = client.clone();
            async move {
                let seeds = args.get_string_list("seed_tracks")?;
                let tracks = client.get_recommendations(&seeds, limit_arg(&args)?).await?;
                Ok(json!({ "recommendations": tracks }))
            }
        },
    );

    vec![
        Arc::new(search_track),
        Arc::new(search_artist),
        Arc::new(get_track_info),
        Arc::new(get_artist_info),
        Arc::new(get_artist_top_tracks),
        Arc::new(get_recommendations),
    ]
}

/// Playlist tools for the playlist agent.
pub fn playlist_tools(client: Arc<SpotifyClient>) -> Vec<Arc<dyn Tool>> {
    let get_playlist = AgentTool::new(
        "get_playlist",
        "Get playlist information and tracks by playlist ID",
        AgentToolParameters::object()
            .string("playlist_id", "Spotify playlist ID, URI or link", true)
            .build(),
        move |args, _ctx| {
            let client = client.clone();
            async move {
                let playlist = client.get_playlist(args.get_str("playlist_id")?).await?;
                Ok(serde_json::to_value(playlist)?)
            }
        },
    );
    vec![Arc::new(get_playlist)]
}

/// Playback tools for the playback agent. All of them need user authorization.
pub fn playback_tools(client: Arc<SpotifyClient>) -> Vec<Arc<dyn Tool>> {
    let get_playback_state = {
        let client = client.clone();
        AgentTool::new(
            "get_playback_state",
            "Get what is currently playing and on which device",
            AgentToolParameters::empty(),
            move |_args, _ctx| {
                let client = client.clone();
                async move {
                    match client.current_playback().await? {
                        Some(state) => Ok(serde_json::to_value(state)?),
                        None => Ok(json!({ "is_playing": false, "message": "Nothing is playing" })),
                    }
                }
            },
        )
    };

    let list_devices = {
        let client = client.clone();
        AgentTool::new(
            "list_devices",
            "List the user's available Spotify devices",
            AgentToolParameters::empty(),
            move |_args, _ctx| {
                let client = client.clone();
                async move {
                    let devices = client.devices().await?;
                    Ok(json!({ "devices": devices }))
                }
            },
        )
    };

    let play = {
        let client = client.clone();
        AgentTool::new(
            "play",
            "Start or resume playback. Pass track IDs to play specific tracks, or an \
             album, artist or playlist to play it as a context. With no arguments, resumes.",
            AgentToolParameters::object()
                .string_array("track_ids", "Track IDs, URIs or links to play in order", false)
                .string("context", "Album, artist or playlist URI or link to play", false)
                .string("device_id", "Device to play on (default: active device)", false)
                .build(),
            move |args, _ctx| {
                let client = client.clone();
                async move {
                    let mut request = PlayRequest::resume();
                    if let Some(ids) = args.get_string_list_opt("track_ids")? {
                        request.uris = ids
                            .iter()
                            .map(|id| to_uri(SpotifyKind::Track, id))
                            .collect::<Result<_, _>>()?;
                    }
                    if let Some(context) = args.get_str_opt("context").filter(|c| !c.trim().is_empty()) {
                        request.context_uri = Some(context_uri(context)?);
                    }
                    request.device_id = args.get_str_opt("device_id").map(String::from);
                    client.play(&request).await?;
                    Ok(json!({ "status": "playing" }))
                }
            },
        )
    };

    let pause = {
        let client = client.clone();
        AgentTool::new(
            "pause",
            "Pause playback",
            AgentToolParameters::empty(),
            move |_args, _ctx| {
                let client = client.clone();
                async move {
                    client.pause().await?;
                    Ok(json!({ "status": "paused" }))
                }
            },
        )
    };

    let next_track = {
        let client = client.clone();
        AgentTool::new(
            "next_track",
            "Skip to the next track",
            AgentToolParameters::empty(),
            move |_args, _ctx| {
                let client = client.clone();
                async move {
                    client.next_track().await?;
                    Ok(json!({ "status": "skipped to next track" }))
                }
            },
        )
    };

    let previous_track = {
        let client = client.clone();
        AgentTool::new(
            "previous_track",
            "Go back to the previous track",
            AgentToolParameters::empty(),
            move |_args, _ctx| {
                let client = client.clone();
                async move {
                    client.previous_track().await?;
                    Ok(json!({ "status": "went back to previous track" }))
                }
            },
        )
    };

    let set_volume = {
        let client = client.clone();
        AgentTool::new(
            "set_volume",
            "Set the playback volume",
            AgentToolParameters::object()
                .integer("volume_percent", "Volume from 0 to 100", true)
                .build(),
            move |args, _ctx| {
                let client = client.clone();
                async move {
                    let percent = args.get_u64_opt("volume_percent")?.unwrap_or_default();
                    let percent = u32::try_from(percent).unwrap_or(u32::MAX);
                    client.set_volume(percent).await?;
                    Ok(json!({ "status": "volume set", "volume_percent": percent }))
                }
            },
        )
    };

    let add_to_queue = AgentTool::new(
        "add_to_queue",
        "Add a track to the playback queue",
        AgentToolParameters::object()
            .string("track_id", "Track ID, URI or link to queue", true)
            .build(),
        move |args, _ctx| {
            let client = client.clone();
            async move {
                client.add_to_queue(args.get_str("track_id")?).await?;
                Ok(json!({ "status": "queued" }))
            }
        },
    );

    vec![
        Arc::new(get_playback_state),
        Arc::new(list_devices),
        Arc::new(play),
        Arc::new(pause),
        Arc::new(next_track),
        Arc::new(previous_track),
        Arc::new(set_volume),
        Arc::new(add_to_queue),
    ]
}
