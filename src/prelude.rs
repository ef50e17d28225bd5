//! Convenience re-exports for common use.

pub use crate::agent::{Agent, Coordinator, CoordinatorOptions};
pub use crate::config::MaestroConfig;
pub use crate::error::{MaestroError, Result};
pub use crate::music::{MusicError, SpotifyClient};
pub use crate::provider::{create_provider, LanguageModel, ModelProvider};
pub use crate::tools::{AgentTool, AgentToolParameters, DelegateTool, Tool, ToolArguments, ToolRegistry};
pub use crate::types::{GenerationSettings, ModelMessage, Role};
