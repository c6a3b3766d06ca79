//! Normalisation of backend response bodies.

use std::num::FpCategory;

use serde_json::Value;

/// Collapse the shapes `/chat` may answer with into one reply string.
///
/// A bare string is used as is. For an object, a filled-in `answer` wins over
/// a filled-in `response`. Anything else is serialised so the reply is never
/// silently dropped.
pub fn normalize_reply(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        Value::Object(fields) => ["answer", "response"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(field_text))
            .unwrap_or_else(|| payload.to_string()),
        other => other.to_string(),
    }
}

/// Text of a field the backend filled in.
///
/// `null`, `false`, `0` and `""` count as absent. Other non-string values are
/// serialised.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64().is_some_and(|f| f.classify() == FpCategory::Zero) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// What a 2xx `/upload` body says about the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReply {
    /// `status` is exactly `"success"`.
    Accepted(Option<String>),
    /// Any other status, including a missing or non-string one.
    Refused(Option<String>),
}

impl UploadReply {
    pub fn from_body(payload: &Value) -> Self {
        let message = payload.get("message").and_then(field_text);
        if payload.get("status").and_then(Value::as_str) == Some("success") {
            Self::Accepted(message)
        } else {
            Self::Refused(message)
        }
    }
}

/// Pull a `message` or `error` field out of an error body, if it parses as JSON.
pub fn error_message(body: &[u8]) -> Option<String> {
    let payload: Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(field_text))
}
