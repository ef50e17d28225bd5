//! Error types for Maestro.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

use crate::auth::AuthError;
use crate::music::MusicError;

/// Primary error type for all Maestro operations.
#[derive(Error, Debug)]
pub enum MaestroError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("LLM backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("LLM backend error (status {status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Invalid arguments for {tool_name}: {message}")]
    ToolArgument { tool_name: String, message: String },

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Agent '{0}' is already handling a request")]
    AgentBusy(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Music(#[from] MusicError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MaestroError {
    /// Wrap a handler failure, keeping its message for the model to read.
    pub fn tool_execution(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::BackendUnavailable(_) => ErrorCategory::Backend,
            Self::Backend { .. } => ErrorCategory::Backend,
            Self::UnknownTool(_)
            | Self::DuplicateTool(_)
            | Self::ToolArgument { .. }
            | Self::ToolExecution { .. }
            | Self::AgentBusy(_)
            | Self::InvalidArgument(_) => ErrorCategory::Tool,
            Self::Music(MusicError::AuthorizationRequired) => ErrorCategory::Authorization,
            Self::Music(MusicError::Unauthorized(_)) => ErrorCategory::Authorization,
            Self::Music(MusicError::RateLimited { .. }) => ErrorCategory::RateLimit,
            Self::Music(MusicError::NotFound(_)) => ErrorCategory::NotFound,
            Self::Music(_) => ErrorCategory::Domain,
            Self::Auth(_) => ErrorCategory::Authorization,
            Self::Serialization(_) | Self::Io(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether this error aborts the current user request.
    ///
    /// Everything else is reported back to the model as tool output.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::BackendUnavailable(_) | Self::Backend { .. }
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Backend => RecoverySuggestion::CheckBackend,
            ErrorCategory::Authorization => RecoverySuggestion::Authorize,
            ErrorCategory::RateLimit => RecoverySuggestion::RetryLater,
            ErrorCategory::NotFound | ErrorCategory::Tool => RecoverySuggestion::Rephrase,
            ErrorCategory::Domain | ErrorCategory::Unknown => RecoverySuggestion::RetryLater,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, MaestroError>;
