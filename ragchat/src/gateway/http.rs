//! HTTP implementation of the gateway over `reqwest`.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, warn};

use super::reply::{error_message, normalize_reply, UploadReply};
use super::{Gateway, GatewayError};
use crate::models::Attachment;

const CHAT_PATH: &str = "chat";
const UPLOAD_PATH: &str = "upload";

/// Gateway that talks to the backend's `/chat` and `/upload` endpoints.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    chat_url: Url,
    upload_url: Url,
}

impl HttpGateway {
    /// Build a gateway rooted at `base_url` (e.g. `http://localhost:5000`).
    pub fn new(base_url: &Url) -> Self {
        Self {
            client: Client::new(),
            chat_url: endpoint(base_url, CHAT_PATH),
            upload_url: endpoint(base_url, UPLOAD_PATH),
        }
    }
}

/// Append `segment` to the base path, ignoring a trailing slash.
fn endpoint(base: &Url, segment: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    url
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn send_message(&self, text: &str) -> Result<String, GatewayError> {
        let started = Instant::now();
        debug!(url = %self.chat_url, chars = text.chars().count(), "sending chat message");

        let resp = self
            .client
            .post(self.chat_url.clone())
            .json(&serde_json::json!({ "message": text }))
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, "chat request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "chat endpoint returned an error status");
            let body = resp.bytes().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status,
                message: error_message(&body),
            });
        }

        let payload: Value = resp
            .json()
            .await
            .inspect_err(|e| warn!(error = %e, "chat response was not JSON"))?;

        debug!(%status, elapsed_ms = started.elapsed().as_millis(), "chat reply received");
        Ok(normalize_reply(&payload))
    }

    async fn upload_document(&self, attachment: &Attachment) -> Result<String, GatewayError> {
        let started = Instant::now();
        debug!(
            url = %self.upload_url,
            file = %attachment.file_name,
            bytes = attachment.size,
            "uploading document"
        );

        let bytes = tokio::fs::read(&attachment.path)
            .await
            .map_err(|source| GatewayError::Attachment {
                path: attachment.path.clone(),
                source,
            })?;

        let part = Part::bytes(bytes)
            .file_name(attachment.file_name.clone())
            .mime_str(attachment.content_type())?;
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, "upload request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "upload endpoint returned an error status");
            let body = resp.bytes().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status,
                message: error_message(&body),
            });
        }

        let payload: Value = resp
            .json()
            .await
            .inspect_err(|e| warn!(error = %e, "upload response was not JSON"))?;

        match UploadReply::from_body(&payload) {
            UploadReply::Refused(message) => {
                warn!(status = ?payload.get("status"), "backend rejected the upload");
                Err(GatewayError::Backend { message })
            }
            UploadReply::Accepted(message) => {
                debug!(elapsed_ms = started.elapsed().as_millis(), "upload confirmed");
                Ok(message.unwrap_or_else(|| format!("{} uploaded", attachment.file_name)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::{Multipart, State};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use parking_lot::Mutex;
    use serde_json::json;
    use tokio::io::AsyncReadExt;

    use crate::gateway::{within, FailureKind};

    type Captured = Arc<Mutex<Option<Value>>>;
    type Received = Arc<Mutex<Vec<(String, Option<String>, Vec<u8>)>>>;

    /// Bind `app` on an ephemeral port and return its base URL.
    async fn serve(app: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn chat_backend(reply: Value) -> Router {
        Router::new().route("/chat", post(move || async move { Json(reply) }))
    }

    fn upload_backend(reply: Value) -> Router {
        Router::new().route("/upload", post(move || async move { Json(reply) }))
    }

    async fn capture_chat(State(seen): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
        *seen.lock() = Some(body);
        Json(json!({"answer": "42"}))
    }

    async fn record_upload(
        State(received): State<Received>,
        mut multipart: Multipart,
    ) -> Json<Value> {
        let mut name = String::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let field_name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(ToString::to_string);
            name = file_name.clone().unwrap_or_default();
            let data = field.bytes().await.unwrap().to_vec();
            received.lock().push((field_name, file_name, data));
        }
        Json(json!({
            "status": "success",
            "message": format!("{name} processed & embeddings updated"),
        }))
    }

    fn fixture(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> Attachment {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        Attachment::open(&path).unwrap()
    }

    #[test]
    fn test_urls_are_joined_under_the_base_path() {
        let gateway = HttpGateway::new(&Url::parse("http://localhost:5000").unwrap());
        assert_eq!(gateway.chat_url.as_str(), "http://localhost:5000/chat");
        assert_eq!(gateway.upload_url.as_str(), "http://localhost:5000/upload");

        let nested = HttpGateway::new(&Url::parse("http://host/api/rag").unwrap());
        assert_eq!(nested.chat_url.as_str(), "http://host/api/rag/chat");

        let trailing = HttpGateway::new(&Url::parse("http://host/api/").unwrap());
        assert_eq!(trailing.upload_url.as_str(), "http://host/api/upload");
    }

    #[tokio::test]
    async fn test_send_message_posts_json_body() {
        let seen = Captured::default();
        let app = Router::new()
            .route("/chat", post(capture_chat))
            .with_state(seen.clone());
        let gateway = HttpGateway::new(&serve(app).await);

        let reply = gateway.send_message("what is it?").await.unwrap();

        assert_eq!(reply, "42");
        assert_eq!(*seen.lock(), Some(json!({"message": "what is it?"})));
    }

    #[tokio::test]
    async fn test_send_message_normalizes_every_reply_shape() {
        for payload in [json!("X"), json!({"answer": "X"}), json!({"response": "X"})] {
            let gateway = HttpGateway::new(&serve(chat_backend(payload)).await);
            assert_eq!(gateway.send_message("q").await.unwrap(), "X");
        }

        let gateway = HttpGateway::new(&serve(chat_backend(json!({"foo": "bar"}))).await);
        assert_eq!(gateway.send_message("q").await.unwrap(), r#"{"foo":"bar"}"#);
    }

    #[tokio::test]
    async fn test_send_message_maps_error_status_to_request_failed() {
        let app = Router::new().route(
            "/chat",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let gateway = HttpGateway::new(&serve(app).await);

        let err = gateway.send_message("q").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::RequestFailed);
        match err {
            GatewayError::Status { status, message } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(message, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_message_rejects_non_json_body() {
        let app = Router::new().route("/chat", post(|| async { "plain text" }));
        let gateway = HttpGateway::new(&serve(app).await);

        let err = gateway.send_message("q").await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[tokio::test]
    async fn test_send_message_reports_connection_refused() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = HttpGateway::new(&Url::parse(&format!("http://{addr}")).unwrap());
        let err = gateway.send_message("q").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::RequestFailed);
    }

    #[tokio::test]
    async fn test_deadline_closes_a_stalled_connection() {
        // Accepts one request, never answers, and finishes once the client hangs up.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0_u8; 4096];
            let mut received = 0;
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break received,
                    Ok(n) => received += n,
                }
            }
        });
        let gateway = HttpGateway::new(&Url::parse(&format!("http://{addr}")).unwrap());

        let err = within(Duration::from_millis(200), gateway.send_message("q"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Timeout);

        let received = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("connection still open after the deadline")
            .unwrap();
        assert!(received > 0);
    }

    #[tokio::test]
    async fn test_upload_sends_file_field_and_returns_confirmation() {
        let received = Received::default();
        let app = Router::new()
            .route("/upload", post(record_upload))
            .with_state(received.clone());
        let gateway = HttpGateway::new(&serve(app).await);
        let dir = tempfile::tempdir().unwrap();
        let attachment = fixture(&dir, "doc.pdf", b"%PDF-1.4");

        let confirmation = gateway.upload_document(&attachment).await.unwrap();

        assert_eq!(confirmation, "doc.pdf processed & embeddings updated");
        let received = received.lock();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, "file");
        assert_eq!(received[0].1.as_deref(), Some("doc.pdf"));
        assert_eq!(received[0].2, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_upload_without_message_gets_default_confirmation() {
        let app = upload_backend(json!({"status": "success"}));
        let gateway = HttpGateway::new(&serve(app).await);
        let dir = tempfile::tempdir().unwrap();
        let attachment = fixture(&dir, "notes.txt", b"text");

        let confirmation = gateway.upload_document(&attachment).await.unwrap();
        assert_eq!(confirmation, "notes.txt uploaded");
    }

    #[tokio::test]
    async fn test_upload_with_failure_status_field_is_backend_failure() {
        let app = upload_backend(json!({"status": "error", "message": "bad format"}));
        let gateway = HttpGateway::new(&serve(app).await);
        let dir = tempfile::tempdir().unwrap();
        let attachment = fixture(&dir, "notes.md", b"# notes");

        let err = gateway.upload_document(&attachment).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::BackendReportedFailure);
        assert_eq!(err.backend_message(), Some("bad format"));
    }

    #[tokio::test]
    async fn test_upload_failure_with_structured_fields_is_backend_failure() {
        let dir = tempfile::tempdir().unwrap();
        let attachment = fixture(&dir, "notes.md", b"# notes");

        let app = upload_backend(json!({"status": "error", "message": {"detail": "bad format"}}));
        let gateway = HttpGateway::new(&serve(app).await);
        let err = gateway.upload_document(&attachment).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::BackendReportedFailure);
        let detail = err.backend_message().unwrap_or_default();
        assert!(detail.contains("bad format"));

        let app = upload_backend(json!({"status": 500, "message": "disk full"}));
        let gateway = HttpGateway::new(&serve(app).await);
        let err = gateway.upload_document(&attachment).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::BackendReportedFailure);
        assert_eq!(err.backend_message(), Some("disk full"));
    }

    #[tokio::test]
    async fn test_upload_error_status_carries_backend_message() {
        let app = Router::new().route(
            "/upload",
            post(|| async {
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    Json(json!({"status": "error", "message": "file too large"})),
                )
            }),
        );
        let gateway = HttpGateway::new(&serve(app).await);
        let dir = tempfile::tempdir().unwrap();
        let attachment = fixture(&dir, "big.txt", b"...");

        let err = gateway.upload_document(&attachment).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::RequestFailed);
        assert_eq!(err.backend_message(), Some("file too large"));
    }

    #[tokio::test]
    async fn test_upload_of_vanished_file_fails_before_sending() {
        let app = upload_backend(json!({"status": "success", "message": "unreachable"}));
        let gateway = HttpGateway::new(&serve(app).await);
        let dir = tempfile::tempdir().unwrap();
        let attachment = fixture(&dir, "gone.txt", b"bye");
        std::fs::remove_file(&attachment.path).unwrap();

        let err = gateway.upload_document(&attachment).await.unwrap_err();
        assert!(matches!(err, GatewayError::Attachment { .. }));
        assert_eq!(err.kind(), FailureKind::RequestFailed);
    }
}
