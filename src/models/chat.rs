//! Coach chat messages and history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Parse a wire role; system and tool turns have no client-side role.
    pub fn from_wire(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

/// A message in a coach conversation, held only in client state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Client-local identity for rendering; never sent to the backend.
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Body of `POST /coach/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct CoachChatRequest<'a> {
    pub user_id: &'a str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<&'a str>,
}

/// Reply from `POST /coach/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachReply {
    pub role: String,
    pub content: String,
}

impl CoachReply {
    /// Assistant role unless the backend says otherwise.
    pub fn into_message(self) -> ChatMessage {
        let role = ChatRole::from_wire(&self.role).unwrap_or(ChatRole::Assistant);
        ChatMessage::new(role, self.content)
    }
}

/// Response of `GET /coach/history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatHistory {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

/// One stored turn. `content` is the backend's JSON payload, normally
/// `{"text": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl HistoryMessage {
    /// Flatten the stored payload to display text.
    ///
    /// Objects yield their `text` part, or all string values joined with
    /// newlines when there is none. Arrays yield each element's text.
    pub fn text(&self) -> String {
        self.content.as_ref().map(flatten_text).unwrap_or_default()
    }

    /// Convert to a displayable message; `None` for empty or non-chat turns.
    pub fn to_chat_message(&self) -> Option<ChatMessage> {
        let role = ChatRole::from_wire(&self.role)?;
        let text = self.text();
        if text.trim().is_empty() {
            return None;
        }
        Some(ChatMessage::new(role, text))
    }
}

impl ChatHistory {
    pub fn to_chat_messages(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter_map(HistoryMessage::to_chat_message)
            .collect()
    }
}

fn flatten_text(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("text") {
            Some(Value::String(text)) => text.clone(),
            _ => map.values().filter_map(Value::as_str).collect::<Vec<_>>().join("\n"),
        },
        Value::Array(items) => items
            .iter()
            .map(flatten_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}
