//! Todo proxy service: validated CRUD forwarded to the upstream API.
//!
//! Todos are owned by the upstream; nothing is persisted here. Every call
//! carries the caller's access token as a bearer credential.

use serde::{Deserialize, Deserializer, Serialize};

use crate::upstream::{Upstream, UpstreamError, UpstreamReply, UpstreamRequest};

pub const TODO_FIELD_MAX_CHARS: usize = 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TodoError {
    #[error("{0}")]
    Validation(String),
    /// No access token, or the upstream rejected it.
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{message}")]
    Upstream { message: String },
}

impl From<UpstreamError> for TodoError {
    fn from(err: UpstreamError) -> Self {
        Self::Upstream { message: err.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
}

/// Body of a create/update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoInput {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoInput {
    /// Trim and bound `title` and `description` to 1..=100 characters.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Validation`] naming the first offending field.
    pub fn validate(self) -> Result<Self, TodoError> {
        let title = bounded("title", &self.title)?;
        let description = bounded("description", &self.description)?;
        Ok(Self { title, description, completed: self.completed })
    }
}

fn bounded(field: &str, raw: &str) -> Result<String, TodoError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(TodoError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > TODO_FIELD_MAX_CHARS {
        return Err(TodoError::Validation(format!(
            "{field} must be at most {TODO_FIELD_MAX_CHARS} characters"
        )));
    }
    Ok(value.to_owned())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// `GET /todos`
pub async fn list(upstream: &dyn Upstream, access_token: &str) -> Result<Vec<Todo>, TodoError> {
    let reply = send(upstream, access_token, UpstreamRequest::get("/todos")).await?;
    parse(&reply)
}

/// `POST /todos`
pub async fn create(upstream: &dyn Upstream, access_token: &str, input: &TodoInput) -> Result<Todo, TodoError> {
    let reply = send(upstream, access_token, UpstreamRequest::post("/todos", to_body(input))).await?;
    parse(&reply)
}

/// `PUT /todos/{id}`
pub async fn update(
    upstream: &dyn Upstream,
    access_token: &str,
    id: i64,
    input: &TodoInput,
) -> Result<Todo, TodoError> {
    let reply = send(upstream, access_token, UpstreamRequest::put(format!("/todos/{id}"), to_body(input))).await?;
    parse(&reply)
}

/// `DELETE /todos/{id}`
pub async fn delete(upstream: &dyn Upstream, access_token: &str, id: i64) -> Result<(), TodoError> {
    send(upstream, access_token, UpstreamRequest::delete(format!("/todos/{id}"))).await?;
    Ok(())
}

async fn send(
    upstream: &dyn Upstream,
    access_token: &str,
    request: UpstreamRequest,
) -> Result<UpstreamReply, TodoError> {
    if access_token.is_empty() {
        return Err(TodoError::Unauthorized);
    }

    let reply = upstream.send(request.with_bearer(access_token)).await?;
    match reply.status {
        401 => Err(TodoError::Unauthorized),
        _ if !reply.is_success() => {
            let message = reply.message();
            tracing::warn!(status = reply.status, %message, "todo upstream call failed");
            Err(TodoError::Upstream { message })
        }
        _ => Ok(reply),
    }
}

fn to_body(input: &TodoInput) -> serde_json::Value {
    serde_json::json!({
        "title": input.title,
        "description": input.description,
        "completed": input.completed,
    })
}

fn parse<T: serde::de::DeserializeOwned>(reply: &UpstreamReply) -> Result<T, TodoError> {
    reply.json().map_err(|e| {
        tracing::warn!(error = %e, "unexpected todo response body");
        TodoError::Upstream { message: "unexpected response from todo service".into() }
    })
}

#[cfg(test)]
#[path = "todo_test.rs"]
mod tests;
