//! Conversation message history management.

use crate::types::{ModelMessage, Role};

/// Bounded message history that always starts with the system prompt.
///
/// Trimming drops whole turns (a user message and everything up to the next
/// user message), so a tool call is never separated from its result.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ModelMessage>,
    limit: usize,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>, limit: usize) -> Self {
        Self {
            messages: vec![ModelMessage::system(system_prompt)],
            limit: limit.max(2),
        }
    }

    /// Start a new turn with a user message, trimming old turns first.
    pub fn begin_turn(&mut self, text: impl Into<String>) {
        self.messages.push(ModelMessage::user(text));
        self.trim();
    }

    /// Add a raw message.
    pub fn push(&mut self, message: ModelMessage) {
        self.messages.push(message);
    }

    /// Get all messages, system prompt first.
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    pub fn system_prompt(&self) -> String {
        self.messages[0].text()
    }

    /// Messages after the system prompt.
    pub fn turns(&self) -> &[ModelMessage] {
        &self.messages[1..]
    }

    /// Drop everything except the system prompt.
    pub fn clear(&mut self) {
        self.messages.truncate(1);
    }

    /// Number of messages, including the system prompt.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.len() <= 1
    }

    fn trim(&mut self) {
        while self.messages.len() > self.limit {
            // Start of the second turn; the first turn is dropped whole.
            let next_turn = self.messages[2..]
                .iter()
                .position(|m| m.role == Role::User)
                .map(|i| i + 2);
            match next_turn {
                Some(end) => {
                    self.messages.drain(1..end);
                }
                None => break,
            }
        }
    }
}
