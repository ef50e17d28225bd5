//! Spotify OAuth flows and token storage.

pub mod error;
pub mod spotify;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use spotify::{PkceSession, SpotifyAuth, SpotifyCredentials};
pub use store::{FileTokenStore, TokenStore, TokenStoreConfig};
pub use token::Token;
