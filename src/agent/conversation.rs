//! Conversation management

use crate::agent::types::Message;

/// Message history of one session
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    /// Messages in the conversation, excluding the system prompt
    messages: Vec<Message>,
    /// System prompt for this conversation
    system_prompt: Option<String>,
}

impl Conversation {
    /// Create a new conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Append the messages of a completed turn
    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    /// Messages for an API request: system prompt, history, then `pending`
    pub fn api_messages(&self, pending: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.messages.len() + pending.len() + 1);

        if let Some(ref system) = self.system_prompt {
            messages.push(Message::system(system));
        }

        messages.extend(self.messages.iter().cloned());
        messages.extend(pending.iter().cloned());
        messages
    }

    /// All history messages
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Clear all messages. The system prompt stays.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Get message count
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Check if conversation is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
