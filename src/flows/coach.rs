//! Coach chat screen state.

use tracing::warn;

use crate::api::{DEFAULT_HISTORY_LIMIT, FitnessBackend};
use crate::models::ChatMessage;

/// Shown when there is no history yet.
pub const COACH_GREETING: &str = "Hi! I'm your fitness coach. How can I help today?";

/// One coach conversation, optionally scoped to a goal.
#[derive(Debug, Clone, Default)]
pub struct CoachConversation {
    goal_id: Option<String>,
    messages: Vec<ChatMessage>,
    sending: bool,
    error: Option<String>,
}

impl CoachConversation {
    pub fn new(goal_id: Option<String>) -> Self {
        Self {
            goal_id,
            ..Self::default()
        }
    }

    pub fn goal_id(&self) -> Option<&str> {
        self.goal_id.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the transcript with the stored history, or the greeting when
    /// there is none. A failed fetch keeps the greeting and records the error.
    pub async fn load_history(&mut self, backend: &dyn FitnessBackend) {
        self.error = None;
        self.messages = match backend
            .fetch_chat_history(DEFAULT_HISTORY_LIMIT, self.goal_id.as_deref())
            .await
        {
            Ok(history) => history.to_chat_messages(),
            Err(e) => {
                warn!(error = %e, "Loading coach history failed");
                self.error = Some(e.to_string());
                Vec::new()
            }
        };

        if self.messages.is_empty() {
            self.messages.push(ChatMessage::assistant(COACH_GREETING));
        }
    }

    /// Send a message. Blank input is ignored and returns `false`.
    ///
    /// The user's message is appended before the call; the reply is appended
    /// on success, the error text recorded on failure.
    pub async fn send(&mut self, backend: &dyn FitnessBackend, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.sending {
            return false;
        }

        self.error = None;
        self.messages.push(ChatMessage::user(text));
        self.sending = true;
        let result = backend.coach_chat(text, self.goal_id.as_deref()).await;
        self.sending = false;

        match result {
            Ok(reply) => self.messages.push(reply.into_message()),
            Err(e) => {
                warn!(error = %e, "Coach chat failed");
                self.error = Some(e.to_string());
            }
        }
        true
    }
}
