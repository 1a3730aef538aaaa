//! Todo routes: the JSON proxy under `/fast/todo` and the HTML form actions
//! posted by the home page.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::guard::HOME_PATH;
use crate::routes::auth::ErrorBody;
use crate::routes::pages::{Notice, home_page};
use crate::services::session;
use crate::services::todo::{self, TodoError, TodoInput};
use crate::state::AppState;

const FORM_UNAUTHORIZED: &str = "Please login or create account to manage todos";

#[must_use]
pub fn todo_error_to_status(err: &TodoError) -> StatusCode {
    match err {
        TodoError::Validation(_) => StatusCode::BAD_REQUEST,
        TodoError::Unauthorized => StatusCode::UNAUTHORIZED,
        TodoError::Upstream { .. } => StatusCode::BAD_GATEWAY,
    }
}

fn json_error(err: &TodoError) -> Response {
    (todo_error_to_status(err), Json(ErrorBody { message: err.to_string() })).into_response()
}

fn access_token(jar: &CookieJar) -> String {
    session::read(jar).access_token
}

// =============================================================================
// JSON PROXY
// =============================================================================

/// `GET /fast/todo`
pub async fn list_todos(State(state): State<AppState>, jar: CookieJar) -> Response {
    match todo::list(state.upstream.as_ref(), &access_token(&jar)).await {
        Ok(todos) => Json(todos).into_response(),
        Err(e) => json_error(&e),
    }
}

/// `POST /fast/todo`
pub async fn create_todo(State(state): State<AppState>, jar: CookieJar, Json(input): Json<TodoInput>) -> Response {
    let result = match input.validate() {
        Ok(input) => todo::create(state.upstream.as_ref(), &access_token(&jar), &input).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => json_error(&e),
    }
}

/// `PUT /fast/todo/{id}`
pub async fn update_todo(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Json(input): Json<TodoInput>,
) -> Response {
    let result = match input.validate() {
        Ok(input) => todo::update(state.upstream.as_ref(), &access_token(&jar), id, &input).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(updated) => Json(updated).into_response(),
        Err(e) => json_error(&e),
    }
}

/// `DELETE /fast/todo/{id}`
pub async fn delete_todo(State(state): State<AppState>, jar: CookieJar, Path(id): Path<i64>) -> Response {
    match todo::delete(state.upstream.as_ref(), &access_token(&jar), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => json_error(&e),
    }
}

// =============================================================================
// FORM ACTIONS
// =============================================================================

/// Fields posted by the home page. An unchecked checkbox is simply absent.
#[derive(Debug, Deserialize)]
pub struct TodoForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: Option<String>,
}

impl From<TodoForm> for TodoInput {
    fn from(form: TodoForm) -> Self {
        Self { title: form.title, description: form.description, completed: form.completed.is_some() }
    }
}

async fn form_result(state: &AppState, jar: &CookieJar, result: Result<(), TodoError>) -> Response {
    match result {
        Ok(()) => Redirect::to(HOME_PATH).into_response(),
        Err(e) => {
            let message = match &e {
                TodoError::Unauthorized => FORM_UNAUTHORIZED.to_owned(),
                other => other.to_string(),
            };
            let page = home_page(state, jar, Some(&Notice::Error(message))).await;
            (todo_error_to_status(&e), page).into_response()
        }
    }
}

/// `POST /todos`
pub async fn create_todo_form(State(state): State<AppState>, jar: CookieJar, Form(form): Form<TodoForm>) -> Response {
    let result = match TodoInput::from(form).validate() {
        Ok(input) => todo::create(state.upstream.as_ref(), &access_token(&jar), &input)
            .await
            .map(|created| tracing::debug!(id = created.id, "todo created")),
        Err(e) => Err(e),
    };
    form_result(&state, &jar, result).await
}

/// `POST /todos/{id}`
pub async fn update_todo_form(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(form): Form<TodoForm>,
) -> Response {
    let result = match TodoInput::from(form).validate() {
        Ok(input) => todo::update(state.upstream.as_ref(), &access_token(&jar), id, &input)
            .await
            .map(|_| ()),
        Err(e) => Err(e),
    };
    form_result(&state, &jar, result).await
}

/// `POST /todos/{id}/delete`
pub async fn delete_todo_form(State(state): State<AppState>, jar: CookieJar, Path(id): Path<i64>) -> Response {
    let result = todo::delete(state.upstream.as_ref(), &access_token(&jar), id).await;
    form_result(&state, &jar, result).await
}

#[cfg(test)]
#[path = "todos_test.rs"]
mod tests;
