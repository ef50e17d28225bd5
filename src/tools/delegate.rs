//! Agent-as-tool adapter.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::AgentToolParameters;
use crate::error::Result;

/// Anything that turns a text request into a text answer.
#[async_trait]
pub trait Invokable: Send + Sync {
    fn name(&self) -> &str;

    /// What this invokable is for, shown to the calling model.
    fn description(&self) -> &str;

    async fn invoke(&self, input: &str) -> Result<String>;
}

/// Tool that forwards a `task` argument to another [`Invokable`].
///
/// The target keeps its own conversation; only its final text comes back.
pub struct DelegateTool {
    name: String,
    description: String,
    parameters: AgentToolParameters,
    target: Arc<dyn Invokable>,
}

impl DelegateTool {
    pub fn new(target: Arc<dyn Invokable>) -> Self {
        let name = format!("call_{}", snake_case(target.name()));
        let description = format!(
            "Delegate a task to the {}. {}",
            target.name(),
            target.description()
        );
        Self {
            name,
            description,
            parameters: AgentToolParameters::object()
                .string("task", "The task or question to ask the agent", true)
                .build(),
            target,
        }
    }

    pub fn target(&self) -> &Arc<dyn Invokable> {
        &self.target
    }
}

#[async_trait]
impl Tool for DelegateTool {
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
    ) -> Result<serde_json::Value> {
        let task = args.get_str("task")?;
        info!(from = %ctx.agent, to = %self.target.name(), "delegating task");
        let answer = self.target.invoke(task).await?;
        Ok(serde_json::Value::String(answer))
    }
}

fn snake_case(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Upper;

    #[async_trait]
    impl Invokable for Upper {
        fn name(&self) -> &str {
            "Shouting Agent"
        }

        fn description(&self) -> &str {
            "Repeats things loudly."
        }

        async fn invoke(&self, input: &str) -> Result<String> {
            Ok(input.to_uppercase())
        }
    }

    #[test]
    fn name_and_description_follow_target() {
        let tool = DelegateTool::new(Arc::new(Upper));
        assert_eq!(tool.name(), "call_shouting_agent");
        assert_eq!(
            tool.description(),
            "Delegate a task to the Shouting Agent. Repeats things loudly."
        );
        assert_eq!(tool.parameters().required(), vec!["task"]);
    }

    #[tokio::test]
    async fn forwards_task_text() {
        let tool = DelegateTool::new(Arc::new(Upper));
        let out = tool
            .execute(
                &ToolArguments::new(json!({"task": "play jazz"})),
                &ToolExecutionContext::default(),
            )
            .await
            .unwrap();
        assert_eq!(out, json!("PLAY JAZZ"));
    }
}
