//! Coordinator that routes requests to the specialized music agents.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{MaestroConfig, DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_ITERATIONS};
use crate::error::Result;
use crate::music::{playback_tools, playlist_tools, search_tools, SpotifyClient};
use crate::provider::ModelProvider;
use crate::tools::{DelegateTool, Invokable, Tool, ToolRegistry};
use crate::types::GenerationSettings;

use super::agent::Agent;

pub const SEARCH_AGENT_NAME: &str = "Search Agent";
pub const PLAYLIST_AGENT_NAME: &str = "Playlist Agent";
pub const PLAYBACK_AGENT_NAME: &str = "Playback Agent";
pub const COORDINATOR_NAME: &str = "Coordinator Agent";

const SEARCH_PROMPT: &str = "You are a Spotify search specialist. Help users find tracks and \
artists, look up track and artist details, and get recommendations. Use the available tools \
to search Spotify and provide detailed information. When recommending, first find the seed \
track ids with a search.";

const PLAYLIST_PROMPT: &str = "You are a Spotify playlist specialist. Help users explore \
playlists and discover music collections. Use the available tools to get playlist \
information. Playlist ids may be given as bare ids, spotify: URIs or open.spotify.com links.";

const PLAYBACK_PROMPT: &str = "You are a Spotify playback specialist. Control what is playing \
on the user's devices: play, pause, skip, set the volume, queue tracks and report the current \
playback state. Tracks must be given by id, so search for them first if needed. If a tool \
reports that authorization is required, tell the user to run `maestro auth login` and try \
again. If no device is active, ask the user to open Spotify on one of their devices.";

const COORDINATOR_PROMPT: &str = "You are a coordinator that helps users with Spotify-related \
tasks. You can delegate tasks to specialized agents: the Search Agent (for finding tracks and \
artists, track and artist details, recommendations), the Playlist Agent (for playlist \
information) and the Playback Agent (for controlling playback on the user's devices). Decide \
which agent to use based on the user's request, or handle simple queries directly. Pass the \
agent a complete, self-contained task and report its answer back to the user.";

/// Per-agent limits applied to every agent the coordinator builds.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Model calls allowed per run, for each agent.
    pub max_iterations: usize,
    /// Messages kept in each agent's history.
    pub history_limit: usize,
    /// Generation settings shared by all agents.
    pub settings: GenerationSettings,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            settings: GenerationSettings::default(),
        }
    }
}

impl From<&MaestroConfig> for CoordinatorOptions {
    fn from(config: &MaestroConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            history_limit: config.history_limit,
            settings: GenerationSettings::default(),
        }
    }
}

/// The top-level agent plus the three specialists it delegates to.
///
/// Each specialist keeps its own history across delegations; the
/// coordinator only ever sees their final answers.
pub struct Coordinator {
    agent: Agent,
    search: Arc<Agent>,
    playlist: Arc<Agent>,
    playback: Arc<Agent>,
}

impl Coordinator {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        client: Arc<SpotifyClient>,
        options: CoordinatorOptions,
    ) -> Result<Self> {
        let build = |name: &str, prompt: &str, tools: Vec<Arc<dyn Tool>>| -> Result<Agent> {
            Ok(Agent::new(name, prompt, provider.clone())
                .with_tools(ToolRegistry::from_tools(tools)?)
                .with_settings(options.settings.clone())
                .with_max_iterations(options.max_iterations)
                .with_history_limit(options.history_limit))
        };

        let search = Arc::new(build(
            SEARCH_AGENT_NAME,
            SEARCH_PROMPT,
            search_tools(client.clone()),
        )?);
        let playlist = Arc::new(build(
            PLAYLIST_AGENT_NAME,
            PLAYLIST_PROMPT,
            playlist_tools(client.clone()),
        )?);
        let playback = Arc::new(build(
            PLAYBACK_AGENT_NAME,
            PLAYBACK_PROMPT,
            playback_tools(client),
        )?);

        let delegates: Vec<Arc<dyn Tool>> = vec![
            Arc::new(DelegateTool::new(search.clone())),
            Arc::new(DelegateTool::new(playlist.clone())),
            Arc::new(DelegateTool::new(playback.clone())),
        ];
        let agent = build(COORDINATOR_NAME, COORDINATOR_PROMPT, delegates)?;

        Ok(Self {
            agent,
            search,
            playlist,
            playback,
        })
    }

    /// Handle one user request end to end.
    pub async fn run(&self, user_text: &str) -> Result<String> {
        self.agent.run(user_text).await
    }

    /// The routing agent itself.
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn search_agent(&self) -> &Arc<Agent> {
        &self.search
    }

    pub fn playlist_agent(&self) -> &Arc<Agent> {
        &self.playlist
    }

    pub fn playback_agent(&self) -> &Arc<Agent> {
        &self.playback
    }

    /// Forget every conversation, coordinator and specialists alike.
    pub async fn clear_history(&self) {
        self.agent.clear_history().await;
        for agent in [&self.search, &self.playlist, &self.playback] {
            agent.clear_history().await;
        }
    }
}

#[async_trait]
impl Invokable for Coordinator {
    fn name(&self) -> &str {
        self.agent.name()
    }

    fn description(&self) -> &str {
        self.agent.system_prompt()
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        self.run(input).await
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("agent", &self.agent)
            .field("search", &self.search)
            .field("playlist", &self.playlist)
            .field("playback", &self.playback)
            .finish()
    }
}
