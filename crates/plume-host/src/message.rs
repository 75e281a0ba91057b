//! Conversation payload types shared by filters, pipes and tools.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Conversation payload as handed to inlet filters and pipes.
///
/// Only the fields the extensions touch are typed; everything else the host
/// put in the body survives a round trip through `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ChatBody {
    /// Latest user-authored message, if any.
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    /// Insert a system message at the front of the conversation.
    pub fn prepend_system_message(&mut self, content: impl Into<String>) {
        self.messages.insert(0, ChatMessage::system(content));
    }

    /// Append a system message at the end of the conversation.
    pub fn append_system_message(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::system(content));
    }
}
