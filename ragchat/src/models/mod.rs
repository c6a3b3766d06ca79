//! Data models for the chat session.

mod attachment;
mod message;

pub use attachment::{Attachment, AttachmentError};
pub use message::{Message, Sender};
