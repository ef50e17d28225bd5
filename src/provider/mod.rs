//! Model provider trait and implementations.

pub(crate) mod format;
pub mod http;

#[cfg(feature = "ollama")]
pub mod ollama;
#[cfg(feature = "openai")]
pub mod openai;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::MaestroConfig;
use crate::error::MaestroError;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

pub use crate::tools::ToolDefinition;

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Vec<ToolDefinition>,
}

/// Response from a provider: final text, or tool calls to run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResponse {
    pub text: String,
    pub tool_calls: Vec<AgentToolCall>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

impl ProviderResponse {
    /// Final answer without tool calls.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: Some(FinishReason::Stop),
            ..Self::default()
        }
    }

    /// Response requesting the given tool calls.
    pub fn tool_calls(calls: Vec<AgentToolCall>) -> Self {
        Self {
            tool_calls: calls,
            finish_reason: Some(FinishReason::ToolCalls),
            ..Self::default()
        }
    }
}

/// Core trait implemented by all model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "ollama").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Run one non-streaming generation.
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, MaestroError>;

    /// Verify the backend is reachable and serves the model.
    async fn check_connection(&self) -> Result<(), MaestroError> {
        Ok(())
    }
}

/// A `provider:model` selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LanguageModel {
    Ollama(String),
    OpenAi(String),
}

impl LanguageModel {
    pub fn model_id(&self) -> &str {
        match self {
            Self::Ollama(m) | Self::OpenAi(m) => m,
        }
    }

    pub fn provider_name(&self) -> &str {
        match self {
            Self::Ollama(_) => "ollama",
            Self::OpenAi(_) => "openai",
        }
    }
}

impl fmt::Display for LanguageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider_name(), self.model_id())
    }
}

impl FromStr for LanguageModel {
    type Err = MaestroError;

    /// Parse `ollama:llama3.2` or `openai:gpt-4o-mini`. A bare model name
    /// selects Ollama.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (provider, model) = match s.split_once(':') {
            Some((provider, model)) if matches!(provider, "ollama" | "openai") => {
                (provider, model)
            }
            _ => ("ollama", s),
        };
        if model.is_empty() {
            return Err(MaestroError::Configuration(format!(
                "model selector '{s}' names no model"
            )));
        }
        Ok(match provider {
            "openai" => Self::OpenAi(model.to_string()),
            _ => Self::Ollama(model.to_string()),
        })
    }
}

/// Create a provider for the given model, using the provided config.
pub fn create_provider(
    model: &LanguageModel,
    config: &MaestroConfig,
) -> Result<Arc<dyn ModelProvider>, MaestroError> {
    match model {
        #[cfg(feature = "ollama")]
        LanguageModel::Ollama(m) => Ok(Arc::new(ollama::OllamaProvider::new(
            m.clone(),
            config.ollama_base_url.clone(),
            config.llm_timeout,
        )?)),
        #[cfg(feature = "openai")]
        LanguageModel::OpenAi(m) => Ok(Arc::new(openai::OpenAiProvider::new(
            m.clone(),
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.llm_timeout,
        )?)),
        #[allow(unreachable_patterns)]
        other => Err(MaestroError::Configuration(format!(
            "provider '{}' is not enabled in this build",
            other.provider_name()
        ))),
    }
}
