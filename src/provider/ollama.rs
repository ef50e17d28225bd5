//! Ollama local provider (native `/api/chat`).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::MaestroError;
use crate::types::{AgentToolCall, FinishReason, Usage};
use crate::util::timeout::with_timeout;

use super::format::{chat_messages, ArgumentEncoding};
use super::http::{build_client, request_error, status_to_error};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

pub struct OllamaProvider {
    model: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(model: String, base_url: String, timeout: Duration) -> Result<Self, MaestroError> {
        Ok(Self {
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: build_client(timeout)?,
        })
    }

    fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": chat_messages(&request.messages, ArgumentEncoding::Object),
            "stream": false,
        });

        if !request.tools.is_empty() {
            let tools: Vec<_> = request
                .tools
                .iter()
                .map(|t| t.to_function_schema())
                .collect();
            body["tools"] = tools.into();
        }

        let settings = &request.settings;
        let mut options = serde_json::Map::new();
        if let Some(temp) = settings.temperature {
            options.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = settings.top_p {
            options.insert("top_p".into(), top_p.into());
        }
        if let Some(seed) = settings.seed {
            options.insert("seed".into(), seed.into());
        }
        if let Some(max) = settings.max_tokens {
            options.insert("num_predict".into(), max.into());
        }
        if let Some(ref stops) = settings.stop_sequences {
            options.insert("stop".into(), serde_json::json!(stops));
        }
        if !options.is_empty() {
            body["options"] = options.into();
        }

        body
    }
}

#[async_trait]
impl ModelProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, MaestroError> {
        let body = self.build_request_body(request);
        let url = format!("{}/api/chat", self.base_url);

        debug!(model = %self.model, messages = request.messages.len(), "Ollama generate");

        with_timeout(self.timeout, async {
            let resp = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| request_error("ollama", e))?;

            let status = resp.status().as_u16();
            if !resp.status().is_success() {
                let body_text = resp.text().await.unwrap_or_default();
                return Err(status_to_error(status, &body_text));
            }

            let data: OllamaChatResponse =
                resp.json().await.map_err(|e| request_error("ollama", e))?;
            Ok(data.into_provider_response())
        })
        .await
    }

    async fn check_connection(&self) -> Result<(), MaestroError> {
        let url = format!("{}/api/tags", self.base_url);
        let tags: OllamaTags = with_timeout(self.timeout, async {
            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| request_error("ollama", e))?;
            if !resp.status().is_success() {
                let status = resp.status().as_u16();
                let body_text = resp.text().await.unwrap_or_default();
                return Err(status_to_error(status, &body_text));
            }
            resp.json().await.map_err(|e| request_error("ollama", e))
        })
        .await?;

        let wanted = self.model.as_str();
        let present = tags.models.iter().any(|m| {
            m.name == wanted || m.name.strip_suffix(":latest") == Some(wanted)
        });
        if present {
            Ok(())
        } else {
            Err(MaestroError::Configuration(format!(
                "Ollama does not have model '{wanted}'. Run `ollama pull {wanted}`"
            )))
        }
    }
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    done_reason: Option<String>,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

impl OllamaChatResponse {
    fn into_provider_response(self) -> ProviderResponse {
        // Native Ollama responses carry no call ids.
        let tool_calls: Vec<AgentToolCall> = self
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| AgentToolCall {
                id: tc
                    .id
                    .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple())),
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        let finish_reason = if !tool_calls.is_empty() {
            Some(FinishReason::ToolCalls)
        } else {
            match self.done_reason.as_deref() {
                Some("length") => Some(FinishReason::Length),
                Some(_) | None => Some(FinishReason::Stop),
            }
        };

        ProviderResponse {
            text: self.message.content.unwrap_or_default(),
            tool_calls,
            usage: Usage::new(
                self.prompt_eval_count.unwrap_or(0),
                self.eval_count.unwrap_or(0),
            ),
            finish_reason,
        }
    }
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OllamaToolCall>>,
}

#[derive(Deserialize)]
struct OllamaToolCall {
    id: Option<String>,
    function: OllamaFunction,
}

#[derive(Deserialize)]
struct OllamaFunction {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

#[derive(Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Deserialize)]
struct OllamaModelTag {
    name: String,
}
