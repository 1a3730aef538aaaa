//! Auth gateway: login, signup, logout and token refresh against the
//! upstream identity API.
//!
//! DESIGN
//! ======
//! Credentials are checked locally before any network call and dropped after
//! the one request that consumes them. A login writes the whole session
//! cookie set only after the upstream reply has been fully parsed, so a
//! failed login leaves the jar untouched.

use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::config::CookiePolicy;
use crate::services::session::{self, Session};
use crate::services::todo::Todo;
use crate::upstream::{Upstream, UpstreamError, UpstreamReply, UpstreamRequest};

const LOGIN_MIN_CHARS: usize = 3;
const USERNAME_MIN_CHARS: usize = 3;
const USERNAME_MAX_CHARS: usize = 100;
const PASSWORD_MIN_CHARS: usize = 6;

const MISSING_FIELDS: &str = "Missing required fields";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// Rejected locally; never reaches the upstream.
    #[error("{0}")]
    Validation(String),
    /// Upstream answered 401 to a login.
    #[error("{0}")]
    InvalidCredentials(String),
    /// Upstream answered 409 to a signup.
    #[error("{0}")]
    Conflict(String),
    /// Upstream rejected a bearer or refresh token.
    #[error("Unauthorized")]
    Unauthorized,
    /// Any other non-success status, or a transport failure.
    #[error("{message}")]
    Upstream { message: String },
}

impl From<UpstreamError> for AuthError {
    fn from(err: UpstreamError) -> Self {
        Self::Upstream { message: err.to_string() }
    }
}

// =============================================================================
// FORMS
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] when a field is shorter than three characters.
    pub fn validate(&self) -> Result<(), AuthError> {
        min_chars("username", &self.username, LOGIN_MIN_CHARS)?;
        min_chars("password", &self.password, LOGIN_MIN_CHARS)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}

impl SignupForm {
    /// Field shape checks plus the password confirmation match. The gateway's
    /// [`signup`] does not see `confirm_password`, so this must run first.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] describing the first failing rule.
    pub fn validate(&self) -> Result<(), AuthError> {
        min_chars("username", &self.username, USERNAME_MIN_CHARS)?;
        if self.username.trim().chars().count() > USERNAME_MAX_CHARS {
            return Err(AuthError::Validation(format!(
                "Username too long. Max {USERNAME_MAX_CHARS} characters"
            )));
        }
        if !is_email(&self.email) {
            return Err(AuthError::Validation("Invalid email".into()));
        }
        min_chars("password", &self.password, PASSWORD_MIN_CHARS)?;
        min_chars("confirm password", &self.confirm_password, PASSWORD_MIN_CHARS)?;
        if self.password != self.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".into()));
        }
        Ok(())
    }
}

fn min_chars(field: &str, value: &str, min: usize) -> Result<(), AuthError> {
    if value.trim().chars().count() < min {
        return Err(AuthError::Validation(format!("{field} must be at least {min} characters")));
    }
    Ok(())
}

#[must_use]
pub fn is_email(raw: &str) -> bool {
    let email = raw.trim();
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// User record returned by a successful signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub todos: Vec<Todo>,
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Sign in upstream and write the resulting session into `jar`.
///
/// # Errors
///
/// - [`AuthError::Validation`] if either field is empty (no network call).
/// - [`AuthError::InvalidCredentials`] on upstream 401.
/// - [`AuthError::Upstream`] on any other failure or a malformed token reply.
pub async fn login(
    upstream: &dyn Upstream,
    jar: CookieJar,
    policy: &CookiePolicy,
    username: &str,
    password: &str,
) -> Result<(CookieJar, Session), AuthError> {
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(MISSING_FIELDS.into()));
    }

    let request = UpstreamRequest::post(
        "/users/signin",
        serde_json::json!({ "username": username, "password": password }),
    );
    let reply = upstream.send(request).await?;

    if reply.status == 401 {
        return Err(AuthError::InvalidCredentials(reply.message()));
    }
    let reply = success(reply)?;

    let tokens: TokenResponse = reply.json().map_err(|e| {
        tracing::warn!(error = %e, "unexpected login response body");
        unexpected("login")
    })?;
    if tokens.access_token.is_empty() || tokens.refresh_token.is_empty() {
        return Err(unexpected("login"));
    }

    let session = Session {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        username: tokens.username.unwrap_or_else(|| username.to_owned()),
        token_type: tokens.token_type.unwrap_or_else(|| "bearer".to_owned()),
    };
    tracing::info!(username = %session.username, "user logged in");
    Ok((session::write(jar, &session, policy), session))
}

/// Register a user upstream. Does not log the user in.
///
/// # Errors
///
/// - [`AuthError::Validation`] if any field is empty (no network call).
/// - [`AuthError::Conflict`] on upstream 409 (duplicate username or email).
/// - [`AuthError::Upstream`] on any other failure.
pub async fn signup(upstream: &dyn Upstream, username: &str, email: &str, password: &str) -> Result<User, AuthError> {
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(MISSING_FIELDS.into()));
    }

    let request = UpstreamRequest::post(
        "/users",
        serde_json::json!({ "username": username, "email": email, "password": password }),
    );
    let reply = upstream.send(request).await?;

    if reply.status == 409 {
        return Err(AuthError::Conflict(reply.message()));
    }
    let reply = success(reply)?;

    let user: User = reply.json().map_err(|e| {
        tracing::warn!(error = %e, "unexpected signup response body");
        unexpected("signup")
    })?;
    tracing::info!(user_id = user.id, username = %user.username, "user signed up");
    Ok(user)
}

/// Drop the session. No network call; always succeeds.
#[must_use]
pub fn logout(jar: CookieJar, policy: &CookiePolicy) -> CookieJar {
    tracing::info!("session cleared on logout");
    session::clear(jar, policy)
}

/// Mint a new access token from a refresh token.
///
/// # Errors
///
/// - [`AuthError::Unauthorized`] on upstream 401 (refresh token invalid or expired).
/// - [`AuthError::Upstream`] on any other failure, or a reply without a token.
pub async fn refresh(upstream: &dyn Upstream, refresh_token: &str) -> Result<String, AuthError> {
    if refresh_token.is_empty() {
        return Err(AuthError::Unauthorized);
    }

    let request = UpstreamRequest::post("/users/token/refresh", serde_json::json!({ "refresh_token": refresh_token }));
    let reply = upstream.send(request).await?;

    match reply.status {
        401 => Err(AuthError::Unauthorized),
        200 => {
            let body: RefreshResponse = reply.json().map_err(|_| unexpected("refresh"))?;
            if body.access_token.is_empty() {
                return Err(unexpected("refresh"));
            }
            Ok(body.access_token)
        }
        _ => Err(AuthError::Upstream { message: reply.message() }),
    }
}

fn success(reply: UpstreamReply) -> Result<UpstreamReply, AuthError> {
    if reply.is_success() {
        Ok(reply)
    } else {
        let message = reply.message();
        tracing::warn!(status = reply.status, %message, "identity upstream call failed");
        Err(AuthError::Upstream { message })
    }
}

fn unexpected(operation: &str) -> AuthError {
    AuthError::Upstream { message: format!("unexpected {operation} response from identity service") }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
