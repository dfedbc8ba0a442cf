//! Message model for chatdock conversations.
//!
//! Local messages carry a closed [`Role`]. The backend speaks its own
//! vocabulary (`"ai"` / `"user"` roles, `content` fields), so the wire types
//! live here too and are translated with [`translate_history`].

use serde::{Deserialize, Serialize};

/// Author of a message as shown in the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person using the widget.
    User,
    /// Produced by the chat service (or synthesized on failure).
    Bot,
}

/// A single entry in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a bot message.
    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
        }
    }

    /// Whether this message was authored by the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// One record of the backend's stored history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Backend role string; `"ai"` for replies, anything else for the user.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl From<HistoryEntry> for Message {
    fn from(entry: HistoryEntry) -> Self {
        let role = if entry.role == "ai" {
            Role::Bot
        } else {
            Role::User
        };
        Self {
            role,
            content: entry.content,
        }
    }
}

/// Body of `GET {prefix}/history/{user_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

/// Body of `POST {prefix}/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: Option<String>,
}

/// Response of `POST {prefix}/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Translate backend history records into local messages, preserving order.
pub fn translate_history(entries: Vec<HistoryEntry>) -> Vec<Message> {
    entries.into_iter().map(Message::from).collect()
}
