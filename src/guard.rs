//! Route guard: per-request allow/redirect/refresh decision for pages.
//!
//! DESIGN
//! ======
//! The guard is a pure function of (session cookies, path) plus at most one
//! upstream refresh call. [`decide`] holds the state table; [`evaluate`]
//! performs the refresh when the table asks for it; [`route_guard`] is the
//! axum middleware wrapper.
//!
//! | state \ page   | Login        | Home    | Other                      |
//! |----------------|--------------|---------|----------------------------|
//! | Anonymous      | Allow        | Allow   | RedirectHome (strict)      |
//! | Stale          | Allow        | Refresh | Refresh                    |
//! | Authenticated  | RedirectHome | Allow   | RedirectHome (strict)      |
//!
//! A successful refresh answers with a redirect back to the same URL, never
//! the page itself, so the retried request arrives with the new access token.
//! A rejected refresh token clears the session before redirecting to login;
//! otherwise the next request would try the same dead token again.

use axum::extract::{Request, State};
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::services::auth::{self, AuthError};
use crate::services::session::{self, AuthState};
use crate::state::AppState;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Login,
    Other,
}

impl Page {
    #[must_use]
    pub fn classify(path: &str) -> Self {
        match path {
            HOME_PATH => Self::Home,
            LOGIN_PATH => Self::Login,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectHome,
    /// Refresh the access token, then redirect to the requested URL. Resolves
    /// to a login redirect when the refresh fails.
    Refresh,
}

#[must_use]
pub fn decide(state: AuthState, page: Page, strict_allowlist: bool) -> Decision {
    match (page, state) {
        (Page::Login, AuthState::Authenticated) => Decision::RedirectHome,
        (Page::Login, _) => Decision::Allow,
        (_, AuthState::Stale) => Decision::Refresh,
        (Page::Other, _) if strict_allowlist => Decision::RedirectHome,
        _ => Decision::Allow,
    }
}

#[derive(Debug)]
pub enum GuardOutcome {
    Allow,
    /// Respond with a temporary redirect carrying the jar's cookie changes.
    Redirect { to: String, jar: CookieJar },
}

impl GuardOutcome {
    fn redirect(to: impl Into<String>, jar: CookieJar) -> Self {
        Self::Redirect { to: to.into(), jar }
    }
}

/// Run the guard for one request.
pub async fn evaluate(state: &AppState, jar: CookieJar, uri: &Uri) -> GuardOutcome {
    let current = session::read(&jar);
    let page = Page::classify(uri.path());

    match decide(current.auth_state(), page, state.config.strict_allowlist) {
        Decision::Allow => GuardOutcome::Allow,
        Decision::RedirectHome => GuardOutcome::redirect(HOME_PATH, jar),
        Decision::Refresh => refresh_then_redirect(state, jar, &current.refresh_token, uri).await,
    }
}

async fn refresh_then_redirect(state: &AppState, jar: CookieJar, refresh_token: &str, uri: &Uri) -> GuardOutcome {
    let policy = state.cookie_policy();
    match auth::refresh(state.upstream.as_ref(), refresh_token).await {
        Ok(access_token) => {
            tracing::info!(path = %uri.path(), "session refreshed");
            let jar = session::write_access_token(jar, &access_token, policy);
            GuardOutcome::redirect(original_target(uri), jar)
        }
        Err(AuthError::Unauthorized) => {
            tracing::info!(path = %uri.path(), "refresh token rejected, clearing session");
            GuardOutcome::redirect(LOGIN_PATH, session::clear(jar, policy))
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %uri.path(), "session refresh failed");
            GuardOutcome::redirect(LOGIN_PATH, jar)
        }
    }
}

/// Same-origin path and query of the request. A leading `//` or `/\` would
/// make the `Location` protocol-relative, so any run of slashes and
/// backslashes at the start collapses to a single `/`.
fn original_target(uri: &Uri) -> String {
    let target = uri.path_and_query().map_or(HOME_PATH, |pq| pq.as_str());
    format!("/{}", target.trim_start_matches(['/', '\\']))
}

/// Axum middleware entry point; mount with `middleware::from_fn_with_state`.
pub async fn route_guard(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    match evaluate(&state, jar, request.uri()).await {
        GuardOutcome::Allow => next.run(request).await,
        GuardOutcome::Redirect { to, jar } => (jar, Redirect::temporary(&to)).into_response(),
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
