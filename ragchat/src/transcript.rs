//! Append-only transcript store.
//!
//! Entries are kept in append order and never edited or removed. The store
//! hands out shared references only, so a message cannot change after it has
//! been appended.

use crate::models::Message;

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Start a transcript with a single greeting.
    pub fn seeded(greeting: Message) -> Self {
        Self {
            messages: vec![greeting],
        }
    }

    /// Append a message. Always succeeds.
    pub fn append(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Entries appended at or after `index`.
    pub fn since(&self, index: usize) -> &[Message] {
        self.messages.get(index..).unwrap_or_default()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
