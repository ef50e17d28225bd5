//! Conversation formatting shared by the chat-style backends.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::types::{ModelMessage, Role};

/// How a backend expects tool-call arguments to be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgumentEncoding {
    /// Arguments as a JSON object (Ollama native).
    Object,
    /// Arguments as a JSON-encoded string (OpenAI).
    String,
}

/// Render a history as chat messages.
///
/// Tool results always carry the originating call id. Ollama also gets the
/// tool name; OpenAI rejects unknown keys on tool messages.
pub(crate) fn chat_messages(messages: &[ModelMessage], encoding: ArgumentEncoding) -> Vec<Value> {
    let mut call_names: HashMap<&str, &str> = HashMap::new();
    let mut out = Vec::with_capacity(messages.len());

    for msg in messages {
        let calls = msg.tool_calls();
        if !calls.is_empty() {
            let rendered: Vec<Value> = calls
                .into_iter()
                .map(|tc| {
                    call_names.insert(tc.id.as_str(), tc.name.as_str());
                    json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.name,
                            "arguments": encode_arguments(&tc.arguments, encoding),
                        }
                    })
                })
                .collect();
            let text = msg.text();
            out.push(json!({
                "role": "assistant",
                "content": text,
                "tool_calls": rendered,
            }));
            continue;
        }

        if let Some(result) = msg.tool_result_part() {
            let mut rendered = json!({
                "role": "tool",
                "tool_call_id": result.tool_call_id,
                "content": result.content_text(),
            });
            if encoding == ArgumentEncoding::Object {
                if let Some(name) = call_names.get(result.tool_call_id.as_str()) {
                    rendered["tool_name"] = json!(name);
                }
            }
            out.push(rendered);
            continue;
        }

        out.push(json!({
            "role": role_name(msg.role),
            "content": msg.text(),
        }));
    }

    out
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

fn encode_arguments(arguments: &Value, encoding: ArgumentEncoding) -> Value {
    match (encoding, arguments) {
        (ArgumentEncoding::Object, Value::String(raw)) => {
            serde_json::from_str(raw).unwrap_or_else(|_| json!({}))
        }
        (ArgumentEncoding::Object, other) => other.clone(),
        (ArgumentEncoding::String, Value::String(raw)) => Value::String(raw.clone()),
        (ArgumentEncoding::String, other) => Value::String(other.to_string()),
    }
}
