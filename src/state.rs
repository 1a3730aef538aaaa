//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds only immutable configuration and the upstream client; all session
//! state travels in request/response cookies, so nothing here is mutated
//! after startup.

use std::sync::Arc;

use crate::config::{AppConfig, CookiePolicy};
use crate::upstream::Upstream;

/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub upstream: Arc<dyn Upstream>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, upstream: Arc<dyn Upstream>) -> Self {
        Self { config: Arc::new(config), upstream }
    }

    #[must_use]
    pub fn cookie_policy(&self) -> &CookiePolicy {
        &self.config.cookies
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::http::{HeaderMap, HeaderValue};
    use axum::response::{IntoResponse, Response};
    use axum_extra::extract::cookie::CookieJar;

    use super::*;
    use crate::config::UpstreamTimeouts;
    use crate::upstream::{UpstreamError, UpstreamReply, UpstreamRequest};

    /// Upstream stand-in that replays canned replies in order and records
    /// every request it receives.
    pub struct MockUpstream {
        replies: Mutex<VecDeque<Result<UpstreamReply, UpstreamError>>>,
        requests: Mutex<Vec<UpstreamRequest>>,
    }

    impl MockUpstream {
        #[must_use]
        pub fn new(replies: Vec<Result<UpstreamReply, UpstreamError>>) -> Arc<Self> {
            Arc::new(Self { replies: Mutex::new(replies.into()), requests: Mutex::new(Vec::new()) })
        }

        /// No canned replies; any call gets a transport error.
        #[must_use]
        pub fn silent() -> Arc<Self> {
            Self::new(Vec::new())
        }

        #[must_use]
        pub fn replying(status: u16, body: serde_json::Value) -> Arc<Self> {
            Self::new(vec![Ok(UpstreamReply::new(status, body.to_string()))])
        }

        #[must_use]
        pub fn requests(&self) -> Vec<UpstreamRequest> {
            self.requests.lock().unwrap().clone()
        }

        #[must_use]
        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl Upstream for MockUpstream {
        async fn send(&self, request: UpstreamRequest) -> Result<UpstreamReply, UpstreamError> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(UpstreamError::Request("no canned reply".into())))
        }
    }

    #[must_use]
    pub fn test_config() -> AppConfig {
        AppConfig {
            api_url: "http://upstream.test".into(),
            port: 0,
            cookies: CookiePolicy::default(),
            timeouts: UpstreamTimeouts::default(),
            strict_allowlist: true,
        }
    }

    #[must_use]
    pub fn test_app_state(upstream: Arc<MockUpstream>) -> AppState {
        AppState::new(test_config(), upstream)
    }

    /// Build a request-side jar as if the browser sent these cookies.
    #[must_use]
    pub fn request_jar(cookies: &[(&str, &str)]) -> CookieJar {
        let mut headers = HeaderMap::new();
        if !cookies.is_empty() {
            let raw = cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            headers.insert(COOKIE, HeaderValue::from_str(&raw).unwrap());
        }
        CookieJar::from_headers(&headers)
    }

    /// `Set-Cookie` header values a response carries.
    #[must_use]
    pub fn set_cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_owned())
            .collect()
    }

    /// `Set-Cookie` header values produced by the jar's pending changes.
    #[must_use]
    pub fn jar_set_cookies(jar: CookieJar) -> Vec<String> {
        set_cookies(&(jar, ()).into_response())
    }

    #[must_use]
    pub fn location(response: &Response) -> Option<String> {
        response
            .headers()
            .get(axum::http::header::LOCATION)
            .map(|v| v.to_str().unwrap().to_owned())
    }

    pub async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
