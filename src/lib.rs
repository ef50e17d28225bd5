//! Maestro: a multi-agent Spotify assistant.
//!
//! A coordinator agent reads each request and delegates it to a search,
//! playlist or playback agent. Each agent runs a bounded tool-calling loop
//! against a chat model (Ollama or an OpenAI-compatible endpoint) and calls
//! the Spotify Web API through its tools.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use maestro::prelude::*;
//!
//! # async fn example() -> maestro::error::Result<()> {
//! let config = MaestroConfig::from_env()?;
//! let model: LanguageModel = config.model.parse()?;
//! let provider = create_provider(&model, &config)?;
//! let client = Arc::new(SpotifyClient::new(Arc::new(config.spotify_auth()?), config.http_timeout)?);
//! let coordinator = Coordinator::new(provider, client, CoordinatorOptions::from(&config))?;
//! println!("{}", coordinator.run("Find songs by Queen").await?);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod auth;
pub mod config;
pub mod error;
pub mod music;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
