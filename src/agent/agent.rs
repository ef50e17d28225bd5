//! Agent with its own history and tool set, driving the dispatch loop.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_ITERATIONS};
use crate::error::{MaestroError, Result};
use crate::provider::{ModelProvider, ProviderRequest};
use crate::tools::{Invokable, Tool, ToolExecutionContext, ToolRegistry};
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

use super::conversation::Conversation;

/// An LLM-backed agent that keeps a conversation and can call tools.
///
/// Each [`run`](Agent::run) appends to the agent's own history. Tool
/// failures are fed back to the model as tool output; only fatal errors
/// (configuration or backend connectivity) end a run early, and then the
/// history is restored to what it was before the run.
pub struct Agent {
    name: String,
    system_prompt: String,
    provider: Arc<dyn ModelProvider>,
    tools: ToolRegistry,
    settings: GenerationSettings,
    max_iterations: usize,
    conversation: Mutex<Conversation>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        provider: Arc<dyn ModelProvider>,
    ) -> Self {
        let system_prompt = system_prompt.into();
        Self {
            name: name.into(),
            conversation: Mutex::new(Conversation::new(
                system_prompt.clone(),
                DEFAULT_HISTORY_LIMIT,
            )),
            system_prompt,
            provider,
            tools: ToolRegistry::new(),
            settings: GenerationSettings::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Replace the tool set.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Set generation settings.
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Bound the number of model calls per run. Zero is treated as one.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Bound the number of messages kept in history.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.conversation = Mutex::new(Conversation::new(self.system_prompt.clone(), limit));
        self
    }

    /// Register one more tool.
    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        self.tools.register(tool)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Snapshot of the conversation, system prompt first.
    pub async fn history(&self) -> Vec<ModelMessage> {
        self.conversation.lock().await.messages().to_vec()
    }

    /// Forget every turn, keeping the system prompt.
    pub async fn clear_history(&self) {
        self.conversation.lock().await.clear();
    }

    /// Handle one user request and return the final answer.
    ///
    /// Fails with [`MaestroError::AgentBusy`] if this agent is already in
    /// the middle of a run, which happens when delegation loops back.
    pub async fn run(&self, user_text: &str) -> Result<String> {
        let mut conversation = self
            .conversation
            .try_lock()
            .map_err(|_| MaestroError::AgentBusy(self.name.clone()))?;

        let snapshot = conversation.clone();
        match self.dispatch(&mut conversation, user_text).await {
            Ok(text) => Ok(text),
            Err(err) => {
                warn!(agent = %self.name, error = %err, "run failed, restoring history");
                *conversation = snapshot;
                Err(err)
            }
        }
    }

    async fn dispatch(&self, conversation: &mut Conversation, user_text: &str) -> Result<String> {
        conversation.begin_turn(user_text);
        let tool_defs = self.tools.definitions();
        let mut usage = Usage::default();

        for iteration in 0..self.max_iterations {
            let request = ProviderRequest {
                messages: conversation.messages().to_vec(),
                settings: self.settings.clone(),
                tools: tool_defs.clone(),
            };

            debug!(agent = %self.name, iteration, "calling model");
            let response = self.provider.generate(&request).await?;
            usage.merge(&response.usage);
            if response.finish_reason == Some(FinishReason::Length) {
                warn!(
                    agent = %self.name,
                    iteration,
                    max_tokens = ?self.settings.max_tokens,
                    "model output hit the token limit and may be truncated"
                );
            }

            if response.tool_calls.is_empty() {
                debug!(
                    agent = %self.name,
                    iterations = iteration + 1,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "final answer"
                );
                conversation.push(ModelMessage::assistant(response.text.clone()));
                return Ok(response.text);
            }

            conversation.push(ModelMessage::assistant_with_tool_calls(
                response.text,
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                let result = self.execute_tool_call(call).await?;
                conversation.push(result);
            }
        }

        warn!(
            agent = %self.name,
            max_iterations = self.max_iterations,
            "iteration bound reached without a final answer"
        );
        let fallback = fallback_message(self.max_iterations);
        conversation.push(ModelMessage::assistant(fallback.clone()));
        Ok(fallback)
    }

    /// Run one tool call. Returns `Err` only for fatal errors.
    async fn execute_tool_call(&self, call: &AgentToolCall) -> Result<ModelMessage> {
        info!(agent = %self.name, tool = %call.name, call_id = %call.id, "calling tool");
        let ctx = ToolExecutionContext {
            agent: self.name.clone(),
            call_id: call.id.clone(),
        };

        match self.tools.invoke(&call.name, call.arguments.clone(), &ctx).await {
            Ok(value) => Ok(ModelMessage::tool_result(&call.id, value, false)),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                warn!(agent = %self.name, tool = %call.name, error = %err, "tool call failed");
                Ok(ModelMessage::tool_result(
                    &call.id,
                    serde_json::json!({ "error": err.to_string() }),
                    true,
                ))
            }
        }
    }
}

/// Answer returned when the iteration bound is hit.
pub fn fallback_message(max_iterations: usize) -> String {
    format!(
        "I could not complete this request within {max_iterations} steps. \
         Please try rephrasing or breaking it into smaller requests."
    )
}

#[async_trait]
impl Invokable for Agent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.system_prompt
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        self.run(input).await
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.provider.model_id())
            .field("tools", &self.tools)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}
