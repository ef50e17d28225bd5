//! Spotify catalog and playback access, plus the tools built on it.

pub(crate) mod api;
pub mod client;
pub mod error;
pub mod tools;
pub mod types;

pub use client::{context_uri, normalize_id, to_uri, SpotifyClient, SpotifyKind};
pub use error::MusicError;
pub use tools::{playback_tools, playlist_tools, search_tools};
pub use types::{
    ArtistDetails, ArtistSummary, Device, PlayRequest, PlaybackState, PlaylistDetails,
    TrackDetails, TrackSummary,
};
