//! Wire shapes of the Spotify Web API and their conversion to result types.

use serde::Deserialize;

use super::types::{
    ArtistDetails, ArtistSummary, Device, PlaybackState, PlaylistDetails, TrackDetails,
    TrackSummary,
};

/// Tracks kept from a playlist.
pub(crate) const PLAYLIST_TRACK_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub(crate) struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackSearch {
    pub tracks: Paging<Track>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistSearch {
    pub artists: Paging<Artist>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackList {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Track {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
    pub followers: Option<Followers>,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Followers {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<Owner>,
    pub tracks: Paging<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Owner {
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistItem {
    pub track: Option<Track>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Player {
    #[serde(default)]
    pub is_playing: bool,
    pub item: Option<Track>,
    pub device: Option<ApiDevice>,
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub shuffle_state: bool,
    pub repeat_state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceList {
    #[serde(default)]
    pub devices: Vec<ApiDevice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiDevice {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub is_active: bool,
    pub volume_percent: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorObject,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorObject {
    #[serde(default)]
    pub message: String,
    pub reason: Option<String>,
}

impl Track {
    pub fn summary(self) -> TrackSummary {
        let artist = self
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_else(|| "Unknown artist".to_string());
        TrackSummary {
            id: self.id.unwrap_or_default(),
            name: self.name,
            artist,
            album: self.album.map(|a| a.name),
            uri: self.uri,
        }
    }

    pub fn details(self) -> TrackDetails {
        TrackDetails {
            id: self.id.unwrap_or_default(),
            name: self.name,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
            album: self.album.map(|a| a.name).unwrap_or_default(),
            duration_ms: self.duration_ms,
            popularity: self.popularity,
            uri: self.uri,
        }
    }
}

impl Artist {
    pub fn summary(self) -> ArtistSummary {
        ArtistSummary {
            id: self.id,
            name: self.name,
            genres: self.genres,
            uri: self.uri,
        }
    }

    pub fn details(self) -> ArtistDetails {
        ArtistDetails {
            id: self.id,
            name: self.name,
            genres: self.genres,
            popularity: self.popularity,
            followers: self.followers.map(|f| f.total).unwrap_or(0),
            uri: self.uri,
        }
    }
}

impl Playlist {
    pub fn details(self) -> PlaylistDetails {
        let total_tracks = self.tracks.total;
        PlaylistDetails {
            id: self.id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            owner: self.owner.and_then(|o| o.display_name),
            total_tracks,
            tracks: self
                .tracks
                .items
                .into_iter()
                .filter_map(|item| item.track)
                .take(PLAYLIST_TRACK_LIMIT)
                .map(Track::summary)
                .collect(),
        }
    }
}

impl From<ApiDevice> for Device {
    fn from(device: ApiDevice) -> Self {
        Device {
            id: device.id,
            name: device.name,
            kind: device.kind,
            is_active: device.is_active,
            volume_percent: device.volume_percent,
        }
    }
}

impl Player {
    pub fn state(self) -> PlaybackState {
        PlaybackState {
            is_playing: self.is_playing,
            track: self.item.map(Track::summary),
            device: self.device.map(Device::from),
            progress_ms: self.progress_ms,
            shuffle: self.shuffle_state,
            repeat: self.repeat_state.unwrap_or_else(|| "off".to_string()),
        }
    }
}
