//! Conversation messages: persisted rows and transient prompt turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in a frame conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            "system" => Some(ChatRole::System),
            _ => None,
        }
    }
}

/// One persisted turn in a frame's conversation. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub frame_id: String,
    /// The user whose conversation this is; assistant turns carry the same id.
    pub owner_id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A transient prompt turn handed to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: ChatRole,
    pub content: String,
}

impl Turn {
    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }
}

impl From<&StoredMessage> for Turn {
    fn from(msg: &StoredMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}
