//! Types describing the session's observable state.

use std::time::Duration;

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::models::{Attachment, Message};

/// Which request, if any, is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingReply,
    AwaitingUpload,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingReply => "awaiting reply",
            Self::AwaitingUpload => "awaiting upload",
        }
    }

    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An action refused at the session boundary. Nothing was sent and the
/// transcript is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("message is empty")]
    EmptyInput,

    #[error("busy: {0}")]
    Busy(Phase),

    #[error("no file selected")]
    NoAttachment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient notification shown next to the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Result of a request that reached the gateway.
#[derive(Debug)]
pub struct Outcome {
    /// Assistant message appended to the transcript.
    pub message: Message,
    /// Notification raised alongside, if any.
    pub notice: Option<Notice>,
    /// The gateway failure, when the request did not succeed.
    pub error: Option<GatewayError>,
}

impl Outcome {
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Change notifications for the presentation layer, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    MessageAppended(Message),
    PhaseChanged(Phase),
    AttachmentChanged(Option<Attachment>),
    Notice(Notice),
}

/// Tunables for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Deadline for `/chat`.
    pub chat_timeout: Duration,
    /// Deadline for `/upload`.
    pub upload_timeout: Duration,
    /// Keep the selected file after a failed upload so it can be retried.
    pub retain_attachment_on_failure: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            chat_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(60),
            retain_attachment_on_failure: false,
        }
    }
}
