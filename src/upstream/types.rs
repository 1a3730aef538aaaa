//! Provider-neutral request/reply types and errors for upstream calls.

use reqwest::Method;
use serde::de::DeserializeOwned;

// =============================================================================
// ERROR
// =============================================================================

/// Transport-level failures. HTTP error statuses are not errors here; they
/// come back as an [`UpstreamReply`] for the caller to classify.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum UpstreamError {
    /// The request could not be sent or the body could not be read.
    #[error("upstream request failed: {0}")]
    Request(String),

    /// The request exceeded the configured timeout.
    #[error("upstream request timed out")]
    Timeout,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// REQUEST / REPLY
// =============================================================================

#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    /// Path relative to the configured API base, starting with `/`.
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl UpstreamRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::GET, path: path.into(), bearer: None, body: None }
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self { method: Method::POST, path: path.into(), bearer: None, body: Some(body) }
    }

    #[must_use]
    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self { method: Method::PUT, path: path.into(), bearer: None, body: Some(body) }
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self { method: Method::DELETE, path: path.into(), bearer: None, body: None }
    }

    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

impl UpstreamReply {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// User-facing error message carried by this reply.
    #[must_use]
    pub fn message(&self) -> String {
        upstream_message(self.status, &self.body)
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Object-safe upstream transport, shared across handlers as `Arc<dyn Upstream>`.
#[async_trait::async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamReply, UpstreamError>;
}

// =============================================================================
// ERROR MESSAGES
// =============================================================================

/// Extract one error message from an upstream error body.
///
/// The API reports errors as `{"detail": ...}` on some routes and
/// `{"message": ...}` on others, and its exception handler answers with a
/// plain-text body. All of them collapse to a single string here; an empty
/// body falls back to the HTTP reason phrase.
#[must_use]
pub fn upstream_message(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    let found = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => ["detail", "message"]
            .iter()
            .find_map(|key| map.get(*key).and_then(detail_text)),
        Ok(serde_json::Value::String(text)) => Some(text),
        Ok(_) => None,
        Err(_) => Some(trimmed.to_owned()),
    };

    found
        .map(|m| m.trim().to_owned())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| reason_phrase(status))
}

/// FastAPI validation errors put a list of `{ "msg": ... }` objects in `detail`.
fn detail_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}

fn reason_phrase(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map_or_else(|| format!("upstream returned status {status}"), str::to_owned)
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
