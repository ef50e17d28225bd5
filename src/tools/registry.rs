//! Name-indexed tool registry owned by a single agent.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::ToolDefinition;
use super::validation::validate_arguments;
use crate::error::{MaestroError, Result};

/// Tools an agent may call, kept in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of tools, rejecting duplicate names.
    pub fn from_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Result<Self> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Register a tool. Fails if a tool with the same name exists.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(MaestroError::DuplicateTool(name));
        }
        self.index.insert(name.clone(), self.tools.len());
        self.tools.push(tool);
        debug!(tool = %name, "registered tool");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions for every tool, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    /// Look up, validate and run a tool.
    ///
    /// Handler failures come back as [`MaestroError::ToolExecution`] with
    /// the original message, except fatal errors which pass through as-is.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| MaestroError::UnknownTool(name.to_string()))?;

        let tool_argument_error = |message: String| MaestroError::ToolArgument {
            tool_name: name.to_string(),
            message,
        };
        let arguments = ToolArguments::normalize(arguments).map_err(tool_argument_error)?;
        validate_arguments(&arguments, &tool.parameters().schema).map_err(tool_argument_error)?;

        match tool.execute(&ToolArguments::new(arguments), ctx).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => Err(MaestroError::tool_execution(name, err.to_string())),
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{AgentTool, AgentToolParameters};
    use serde_json::json;

    fn echo_tool(name: &str) -> Arc<dyn Tool> {
        Arc::new(AgentTool::new(
            name,
            "Echo the query",
            AgentToolParameters::object()
                .string("query", "Text to echo", true)
                .build(),
            |args, _ctx| async move { Ok(json!(args.get_str("query")?)) },
        ))
    }

    #[test]
    fn definitions_keep_registration_order() {
        let registry =
            ToolRegistry::from_tools([echo_tool("b"), echo_tool("a"), echo_tool("c")]).unwrap();
        let names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo")).unwrap();
        let err = registry.register(echo_tool("echo")).unwrap_err();
        assert!(matches!(err, MaestroError::DuplicateTool(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn string_arguments_are_parsed() {
        let registry = ToolRegistry::from_tools([echo_tool("echo")]).unwrap();
        let result = registry
            .invoke("echo", json!("{\"query\": \"hi\"}"), &ToolExecutionContext::default())
            .await
            .unwrap();
        assert_eq!(result, json!("hi"));
    }

    #[tokio::test]
    async fn handler_errors_are_wrapped() {
        let failing: Arc<dyn Tool> = Arc::new(AgentTool::new(
            "fail",
            "Always fails",
            AgentToolParameters::empty(),
            |_args, _ctx| async move {
                Err::<serde_json::Value, _>(MaestroError::InvalidArgument("bad id".into()))
            },
        ));
        let registry = ToolRegistry::from_tools([failing]).unwrap();
        let err = registry
            .invoke("fail", json!({}), &ToolExecutionContext::default())
            .await
            .unwrap_err();
        match err {
            MaestroError::ToolExecution { tool_name, message } => {
                assert_eq!(tool_name, "fail");
                assert!(message.contains("bad id"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fatal_errors_pass_through() {
        let failing: Arc<dyn Tool> = Arc::new(AgentTool::new(
            "down",
            "Backend gone",
            AgentToolParameters::empty(),
            |_args, _ctx| async move {
                Err::<serde_json::Value, _>(MaestroError::BackendUnavailable("refused".into()))
            },
        ));
        let registry = ToolRegistry::from_tools([failing]).unwrap();
        let err = registry
            .invoke("down", json!(""), &ToolExecutionContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MaestroError::BackendUnavailable(_)));
    }
}
