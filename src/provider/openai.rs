//! OpenAI-compatible Chat Completions provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::MaestroError;
use crate::types::{AgentToolCall, FinishReason, Usage};
use crate::util::timeout::with_timeout;

use super::format::{chat_messages, ArgumentEncoding};
use super::http::{bearer_headers, build_client, request_error, status_to_error};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

pub struct OpenAiProvider {
    model: String,
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(
        model: String,
        api_key: Option<String>,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, MaestroError> {
        Ok(Self {
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: build_client(timeout)?,
        })
    }

    fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": chat_messages(&request.messages, ArgumentEncoding::String),
            "stream": false,
        });

        let settings = &request.settings;
        if let Some(max) = settings.max_tokens {
            body["max_tokens"] = max.into();
        }
        if let Some(temp) = settings.temperature {
            body["temperature"] = temp.into();
        }
        if let Some(top_p) = settings.top_p {
            body["top_p"] = top_p.into();
        }
        if let Some(seed) = settings.seed {
            body["seed"] = seed.into();
        }
        if let Some(ref stops) = settings.stop_sequences {
            body["stop"] = serde_json::json!(stops);
        }

        if !request.tools.is_empty() {
            let tools: Vec<_> = request
                .tools
                .iter()
                .map(|t| t.to_function_schema())
                .collect();
            body["tools"] = tools.into();
        }

        body
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, MaestroError> {
        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %self.model, messages = request.messages.len(), "OpenAI generate");

        let data: OpenAiChatResponse = with_timeout(self.timeout, async {
            let resp = self
                .client
                .post(&url)
                .headers(bearer_headers(self.api_key.as_deref()))
                .json(&body)
                .send()
                .await
                .map_err(|e| request_error("openai", e))?;

            let status = resp.status().as_u16();
            if !resp.status().is_success() {
                let body_text = resp.text().await.unwrap_or_default();
                return Err(status_to_error(status, &body_text));
            }
            resp.json().await.map_err(|e| request_error("openai", e))
        })
        .await?;

        let choice = data.choices.into_iter().next().ok_or_else(|| MaestroError::Backend {
            status: 200,
            message: "no choices in response".into(),
        })?;

        let tool_calls: Vec<AgentToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| AgentToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: serde_json::Value::String(tc.function.arguments),
            })
            .collect();

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => Some(FinishReason::Length),
            Some("tool_calls") => Some(FinishReason::ToolCalls),
            Some(_) => Some(FinishReason::Stop),
            None => None,
        };

        Ok(ProviderResponse {
            text: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage: data
                .usage
                .map(|u| Usage {
                    input_tokens: u.prompt_tokens,
                    output_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                })
                .unwrap_or_default(),
            finish_reason,
        })
    }

    async fn check_connection(&self) -> Result<(), MaestroError> {
        let url = format!("{}/models", self.base_url);
        with_timeout(self.timeout, async {
            let resp = self
                .client
                .get(&url)
                .headers(bearer_headers(self.api_key.as_deref()))
                .send()
                .await
                .map_err(|e| request_error("openai", e))?;
            if resp.status().is_success() {
                Ok(())
            } else {
                let status = resp.status().as_u16();
                let body_text = resp.text().await.unwrap_or_default();
                Err(status_to_error(status, &body_text))
            }
        })
        .await
    }
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunction,
}

#[derive(Deserialize)]
struct OpenAiFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
