//! Request gateway: the only boundary that talks to the backend.
//!
//! The [`Gateway`] trait is the seam the session controller drives; the HTTP
//! implementation lives in [`http`]. Deadlines are applied with [`within`],
//! which drops the call future when the limit elapses so the underlying
//! connection is torn down rather than left running.

mod error;
mod http;
mod reply;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::models::Attachment;

pub use error::{FailureKind, GatewayError};
pub use http::HttpGateway;

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Send a chat message and return the normalised reply text.
    async fn send_message(&self, text: &str) -> Result<String, GatewayError>;

    /// Upload a document and return the backend's confirmation text.
    async fn upload_document(&self, attachment: &Attachment) -> Result<String, GatewayError>;
}

#[async_trait]
impl<T: Gateway + ?Sized> Gateway for Arc<T> {
    async fn send_message(&self, text: &str) -> Result<String, GatewayError> {
        (**self).send_message(text).await
    }

    async fn upload_document(&self, attachment: &Attachment) -> Result<String, GatewayError> {
        (**self).upload_document(attachment).await
    }
}

/// Run `call`, resolving to [`GatewayError::Timeout`] once `limit` elapses.
pub async fn within<T, F>(limit: Duration, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(GatewayError::Timeout(limit)))
}
