//! Gateway failure taxonomy.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification callers use to pick user-facing copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The call's deadline elapsed.
    Timeout,
    /// Non-2xx status, network failure or undecodable response.
    RequestFailed,
    /// 2xx response whose payload reports a failure.
    BackendReportedFailure,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("server returned {status}")]
    Status {
        status: StatusCode,
        /// `message` field from the error body, when the backend sent one.
        message: Option<String>,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not read {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("backend reported failure: {}", .message.as_deref().unwrap_or("no details"))]
    Backend { message: Option<String> },
}

impl GatewayError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Status { .. } | Self::Transport(_) | Self::Attachment { .. } => {
                FailureKind::RequestFailed
            }
            Self::Backend { .. } => FailureKind::BackendReportedFailure,
        }
    }

    /// The backend's own explanation, if it gave one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::Backend { message } => message.as_deref(),
            _ => None,
        }
    }
}
