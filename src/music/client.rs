//! Spotify Web API client.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::SpotifyAuth;

use super::api;
use super::error::MusicError;
use super::types::{
    ArtistDetails, ArtistSummary, Device, PlayRequest, PlaybackState, PlaylistDetails,
    TrackDetails, TrackSummary,
};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const MAX_RECOMMENDATION_SEEDS: usize = 5;
const MAX_SEARCH_LIMIT: u32 = 50;
const DEFAULT_MARKET: &str = "US";

static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^spotify:(track|artist|album|playlist):([A-Za-z0-9]+)$")
        .expect("spotify uri regex must compile")
});
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://open\.spotify\.com/(?:intl-[A-Za-z-]+/)?(track|artist|album|playlist)/([A-Za-z0-9]+)",
    )
    .expect("spotify url regex must compile")
});
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("spotify id regex must compile"));

/// Kinds of Spotify object an identifier can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SpotifyKind {
    Track,
    Artist,
    Album,
    Playlist,
}

/// Reduce a bare id, `spotify:<kind>:<id>` URI or `open.spotify.com` link
/// to the bare id.
pub fn normalize_id(kind: SpotifyKind, raw: &str) -> Result<String, MusicError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MusicError::InvalidArgument(format!("{kind} id is required")));
    }

    let captured = URI_RE.captures(raw).or_else(|| URL_RE.captures(raw));
    if let Some(caps) = captured {
        let found = &caps[1];
        let expected: &str = kind.as_ref();
        if found != expected {
            return Err(MusicError::InvalidArgument(format!(
                "expected a {kind} but got a {found} reference: {raw}"
            )));
        }
        return Ok(caps[2].to_string());
    }

    if ID_RE.is_match(raw) {
        Ok(raw.to_string())
    } else {
        Err(MusicError::InvalidArgument(format!(
            "'{raw}' is not a valid Spotify {kind} id"
        )))
    }
}

/// Expand an id or link to a `spotify:<kind>:<id>` URI.
pub fn to_uri(kind: SpotifyKind, raw: &str) -> Result<String, MusicError> {
    Ok(format!("spotify:{kind}:{}", normalize_id(kind, raw)?))
}

/// Normalize an album, artist or playlist reference into a context URI.
///
/// A bare id carries no kind, so it is read as a playlist.
pub fn context_uri(raw: &str) -> Result<String, MusicError> {
    let raw = raw.trim();
    let captured = URI_RE.captures(raw).or_else(|| URL_RE.captures(raw));
    match captured {
        Some(caps) if &caps[1] == "track" => Err(MusicError::InvalidArgument(
            "a track cannot be a playback context; pass it as a track instead".into(),
        )),
        Some(caps) => Ok(format!("spotify:{}:{}", &caps[1], &caps[2])),
        None => to_uri(SpotifyKind::Playlist, raw),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Credential {
    /// Client-credentials token, catalog reads only.
    App,
    /// User-authorized token, needed for anything under `/me`.
    User,
}

/// Domain operations over the Spotify Web API.
pub struct SpotifyClient {
    http: reqwest::Client,
    api_url: String,
    auth: Arc<SpotifyAuth>,
    market: String,
}

impl SpotifyClient {
    pub fn new(auth: Arc<SpotifyAuth>, timeout: Duration) -> Result<Self, MusicError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: DEFAULT_API_URL.to_string(),
            auth,
            market: DEFAULT_MARKET.to_string(),
        })
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Market used when an operation requires one and none is given.
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    pub fn auth(&self) -> &Arc<SpotifyAuth> {
        &self.auth
    }

    // ---- catalog -------------------------------------------------------

    pub async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<TrackSummary>, MusicError> {
        let query = require_text("query", query)?;
        let limit = clamp_limit(limit).to_string();
        let result: api::TrackSearch = self
            .get(
                Credential::App,
                "/search",
                &[("q", query), ("type", "track"), ("limit", limit.as_str())],
            )
            .await?;
        Ok(result.tracks.items.into_iter().map(api::Track::summary).collect())
    }

    pub async fn search_artists(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<ArtistSummary>, MusicError> {
        let query = require_text("query", query)?;
        let limit = clamp_limit(limit).to_string();
        let result: api::ArtistSearch = self
            .get(
                Credential::App,
                "/search",
                &[("q", query), ("type", "artist"), ("limit", limit.as_str())],
            )
            .await?;
        Ok(result.artists.items.into_iter().map(api::Artist::summary).collect())
    }

    pub async fn get_track(&self, id: &str) -> Result<TrackDetails, MusicError> {
        let id = normalize_id(SpotifyKind::Track, id)?;
        let track: api::Track = self
            .get(Credential::App, &format!("/tracks/{id}"), &[])
            .await?;
        Ok(track.details())
    }

    pub async fn get_artist(&self, id: &str) -> Result<ArtistDetails, MusicError> {
        let id = normalize_id(SpotifyKind::Artist, id)?;
        let artist: api::Artist = self
            .get(Credential::App, &format!("/artists/{id}"), &[])
            .await?;
        Ok(artist.details())
    }

    pub async fn get_artist_top_tracks(
        &self,
        id: &str,
        market: Option<&str>,
    ) -> Result<Vec<TrackSummary>, MusicError> {
        let id = normalize_id(SpotifyKind::Artist, id)?;
        let market = market.unwrap_or(&self.market);
        let result: api::TrackList = self
            .get(
                Credential::App,
                &format!("/artists/{id}/top-tracks"),
                &[("market", market)],
            )
            .await?;
        Ok(result.tracks.into_iter().map(api::Track::summary).collect())
    }

    /// Recommendations seeded by up to five tracks; extra seeds are ignored.
    pub async fn get_recommendations(
        &self,
        seed_tracks: &[String],
        limit: u32,
    ) -> Result<Vec<TrackSummary>, MusicError> {
        let seeds = seed_tracks
            .iter()
            .take(MAX_RECOMMENDATION_SEEDS)
            .map(|s| normalize_id(SpotifyKind::Track, s))
            .collect::<Result<Vec<_>, _>>()?;
        if seeds.is_empty() {
            return Err(MusicError::InvalidArgument(
                "at least one seed track is required".into(),
            ));
        }
        let seeds = seeds.join(",");
        let limit = clamp_limit(limit).to_string();
        let result: api::TrackList = self
            .get(
                Credential::App,
                "/recommendations",
                &[("seed_tracks", seeds.as_str()), ("limit", limit.as_str())],
            )
            .await?;
        Ok(result.tracks.into_iter().map(api::Track::summary).collect())
    }

    pub async fn get_playlist(&self, id: &str) -> Result<PlaylistDetails, MusicError> {
        let id = normalize_id(SpotifyKind::Playlist, id)?;
        let playlist: api::Playlist = self
            .get(Credential::App, &format!("/playlists/{id}"), &[])
            .await?;
        Ok(playlist.details())
    }

    // ---- playback ------------------------------------------------------

    /// Current playback, or `None` when nothing is playing anywhere.
    pub async fn current_playback(&self) -> Result<Option<PlaybackState>, MusicError> {
        let resp = self
            .send(Credential::User, Method::GET, "/me/player", &[], None)
            .await?;
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let player: api::Player = parse_body(&body)?;
        Ok(Some(player.state()))
    }

    pub async fn devices(&self) -> Result<Vec<Device>, MusicError> {
        let list: api::DeviceList = self
            .get(Credential::User, "/me/player/devices", &[])
            .await?;
        Ok(list.devices.into_iter().map(Device::from).collect())
    }

    pub async fn play(&self, request: &PlayRequest) -> Result<(), MusicError> {
        let mut body = serde_json::Map::new();
        if let Some(context) = &request.context_uri {
            body.insert("context_uri".into(), context.clone().into());
        }
        if !request.uris.is_empty() {
            body.insert("uris".into(), serde_json::json!(request.uris));
        }
        let device = request.device_id.as_deref();
        let query: Vec<(&str, &str)> = device.map(|d| ("device_id", d)).into_iter().collect();
        let body = (!body.is_empty()).then(|| serde_json::Value::Object(body));
        self.command(Method::PUT, "/me/player/play", &query, body)
            .await
    }

    pub async fn pause(&self) -> Result<(), MusicError> {
        self.command(Method::PUT, "/me/player/pause", &[], None).await
    }

    pub async fn next_track(&self) -> Result<(), MusicError> {
        self.command(Method::POST, "/me/player/next", &[], None).await
    }

    pub async fn previous_track(&self) -> Result<(), MusicError> {
        self.command(Method::POST, "/me/player/previous", &[], None)
            .await
    }

    pub async fn set_volume(&self, percent: u32) -> Result<(), MusicError> {
        if percent > 100 {
            return Err(MusicError::InvalidArgument(format!(
                "volume must be between 0 and 100, got {percent}"
            )));
        }
        let percent = percent.to_string();
        self.command(
            Method::PUT,
            "/me/player/volume",
            &[("volume_percent", percent.as_str())],
            None,
        )
        .await
    }

    pub async fn add_to_queue(&self, track: &str) -> Result<(), MusicError> {
        let uri = to_uri(SpotifyKind::Track, track)?;
        self.command(Method::POST, "/me/player/queue", &[("uri", uri.as_str())], None)
            .await
    }

    // ---- transport -----------------------------------------------------

    async fn token(&self, credential: Credential) -> Result<String, MusicError> {
        let token = match credential {
            Credential::App => self.auth.app_access_token().await?,
            Credential::User => self.auth.user_access_token().await?,
        };
        Ok(token)
    }

    async fn send(
        &self,
        credential: Credential,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, MusicError> {
        let token = self.token(credential).await?;
        let url = format!("{}{path}", self.api_url);
        debug!(%method, path, "spotify request");

        let mut request = self.http.request(method, &url).bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        request = match body {
            Some(body) => request.json(&body),
            // Spotify rejects bodyless PUT/POST without a length.
            None => request.header(reqwest::header::CONTENT_LENGTH, 0),
        };

        let resp = request.send().await?;
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(error_from_response(resp).await)
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        credential: Credential,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MusicError> {
        let resp = self.send(credential, Method::GET, path, query, None).await?;
        let body = resp.text().await?;
        parse_body(&body)
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> Result<(), MusicError> {
        self.send(Credential::User, method, path, query, body)
            .await
            .map(|_| ())
    }
}

fn require_text<'a>(name: &str, value: &'a str) -> Result<&'a str, MusicError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(MusicError::InvalidArgument(format!("{name} must not be empty")))
    } else {
        Ok(trimmed)
    }
}

fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_SEARCH_LIMIT)
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, MusicError> {
    serde_json::from_str(body).map_err(|e| MusicError::Api {
        status: 200,
        message: format!("unexpected response shape: {e}"),
    })
}

async fn error_from_response(resp: reqwest::Response) -> MusicError {
    let status = resp.status().as_u16();
    let retry_after_secs = resp
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
    let body = resp.text().await.unwrap_or_default();
    error_from_parts(status, retry_after_secs, &body)
}

pub(crate) fn error_from_parts(
    status: u16,
    retry_after_secs: Option<u64>,
    body: &str,
) -> MusicError {
    let parsed = serde_json::from_str::<api::ErrorBody>(body).ok();
    let reason = parsed.as_ref().and_then(|b| b.error.reason.clone());
    let message = parsed
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"));

    match status {
        401 | 403 => MusicError::Unauthorized(message),
        404 if reason.as_deref() == Some("NO_ACTIVE_DEVICE") => MusicError::NoActiveDevice,
        404 => MusicError::NotFound(message),
        429 => MusicError::RateLimited { retry_after_secs },
        _ => MusicError::Api { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_ids_pass_through() {
        assert_eq!(
            normalize_id(SpotifyKind::Track, " 4uLU6hMCjMI75M1A2tKUQC ").unwrap(),
            "4uLU6hMCjMI75M1A2tKUQC"
        );
    }

    #[test]
    fn uris_and_links_are_reduced_to_ids() {
        assert_eq!(
            normalize_id(SpotifyKind::Track, "spotify:track:abc123").unwrap(),
            "abc123"
        );
        assert_eq!(
            normalize_id(
                SpotifyKind::Playlist,
                "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=xyz"
            )
            .unwrap(),
            "37i9dQZF1DXcBWIGoYBM5M"
        );
        assert_eq!(
            normalize_id(SpotifyKind::Artist, "https://open.spotify.com/intl-de/artist/0OdUWJ0sBjDrqHygGUXeCF")
                .unwrap(),
            "0OdUWJ0sBjDrqHygGUXeCF"
        );
    }

    #[test]
    fn empty_and_malformed_ids_are_invalid() {
        assert!(matches!(
            normalize_id(SpotifyKind::Track, "   "),
            Err(MusicError::InvalidArgument(_))
        ));
        assert!(matches!(
            normalize_id(SpotifyKind::Track, "not an id"),
            Err(MusicError::InvalidArgument(_))
        ));
    }

    #[test]
    fn kind_mismatch_is_invalid() {
        let err = normalize_id(SpotifyKind::Track, "spotify:album:abc").unwrap_err();
        assert!(matches!(err, MusicError::InvalidArgument(msg) if msg.contains("album")));
    }

    #[test]
    fn context_uri_accepts_albums_and_rejects_tracks() {
        assert_eq!(
            context_uri("https://open.spotify.com/album/1A2B?si=q").unwrap(),
            "spotify:album:1A2B"
        );
        assert_eq!(context_uri("37i9dQ").unwrap(), "spotify:playlist:37i9dQ");
        assert!(context_uri("spotify:track:abc").is_err());
    }

    #[test]
    fn to_uri_builds_track_uri() {
        assert_eq!(
            to_uri(SpotifyKind::Track, "https://open.spotify.com/track/abc").unwrap(),
            "spotify:track:abc"
        );
    }

    #[test]
    fn status_codes_map_to_closed_error_set() {
        let body = |reason: &str| {
            format!(r#"{{"error":{{"status":404,"message":"Player command failed","reason":"{reason}"}}}}"#)
        };
        assert!(matches!(
            error_from_parts(401, None, r#"{"error":{"status":401,"message":"The access token expired"}}"#),
            MusicError::Unauthorized(msg) if msg == "The access token expired"
        ));
        assert!(matches!(error_from_parts(403, None, ""), MusicError::Unauthorized(_)));
        assert!(matches!(
            error_from_parts(404, None, &body("NO_ACTIVE_DEVICE")),
            MusicError::NoActiveDevice
        ));
        assert!(matches!(
            error_from_parts(404, None, r#"{"error":{"status":404,"message":"Invalid id"}}"#),
            MusicError::NotFound(msg) if msg == "Invalid id"
        ));
        assert!(matches!(
            error_from_parts(429, Some(7), ""),
            MusicError::RateLimited { retry_after_secs: Some(7) }
        ));
        assert!(matches!(
            error_from_parts(502, None, "bad gateway"),
            MusicError::Api { status: 502, ref message } if message == "HTTP 502"
        ));
    }
}
