//! The [`Tool`] seam between an agent's dispatch loop and the code it can run.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use super::arguments::ToolArguments;
use super::types::{AgentToolParameters, ToolDefinition};
use crate::error::MaestroError;

/// Who asked for a tool call.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    /// Name of the agent whose dispatch loop requested the call.
    pub agent: String,
    /// Id of the tool call being answered.
    pub call_id: String,
}

/// Something an agent can call by name while answering a request.
///
/// Errors returned from [`Tool::execute`] are reported back to the model as
/// tool output unless they are fatal (see [`MaestroError::is_fatal`]).
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to request the call. Unique within a registry.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> &AgentToolParameters;

    /// Run the call. Arguments are already normalized and checked for
    /// required fields.
    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, MaestroError>;

    /// What the model sees when choosing a tool.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().schema.clone(),
        }
    }
}

type Handler = dyn Fn(
        ToolArguments,
        ToolExecutionContext,
    ) -> BoxFuture<'static, Result<serde_json::Value, MaestroError>>
    + Send
    + Sync;

/// A [`Tool`] backed by an async closure.
///
/// The music tool sets are built this way: each closure captures a shared
/// client and maps its typed result to JSON.
pub struct AgentTool {
    name: String,
    description: String,
    parameters: AgentToolParameters,
    handler: Arc<Handler>,
}

impl AgentTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, MaestroError>> + Send + 'static,
    {
        let handler: Arc<Handler> = Arc::new(move |args, ctx| Box::pin(handler(args, ctx)));
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, MaestroError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("parameters", &self.parameters.required())
            .finish_non_exhaustive()
    }
}
