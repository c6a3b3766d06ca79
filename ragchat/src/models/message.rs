//! Message model representing one entry in the chat transcript.

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// Typed by the person at the keyboard.
    User,
    /// Produced by the backend or by the session itself (greeting, errors).
    Assistant,
}

impl Sender {
    /// Lowercase label used when rendering.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message in the transcript. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Time-ordered unique identifier (`UUIDv7`).
    pub id: Uuid,
    /// Text to display, line breaks included.
    pub content: String,
    /// Author of the message.
    pub sender: Sender,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message stamped with the current time.
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for a user-authored message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    /// Shorthand for an assistant-authored message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content)
    }

    /// Local wall-clock time as `HH:MM`, for display.
    pub fn display_time(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }
}
