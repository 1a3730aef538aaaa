//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Page routes (`/`, `/login` and the fallback) run behind the route guard.
//! Form actions, the `/fast` JSON proxy and the health check are mounted
//! beside them without the guard; those handlers read the session cookies
//! themselves and answer 401 or re-render when the session is missing.

pub mod auth;
pub mod pages;
pub mod todos;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::guard;
use crate::state::AppState;

/// Guarded GET pages. The fallback is guarded too, so unknown paths follow
/// the allow-list before they can 404.
fn page_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login_page))
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(state, guard::route_guard))
}

fn action_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login_action))
        .route("/auth/signup", post(auth::signup_action))
        .route("/auth/logout", post(auth::logout_action))
        .route("/fast/login", post(auth::login_json))
        .route("/fast/todo", get(todos::list_todos).post(todos::create_todo))
        .route("/fast/todo/{id}", put(todos::update_todo).delete(todos::delete_todo))
        .route("/todos", post(todos::create_todo_form))
        .route("/todos/{id}", post(todos::update_todo_form))
        .route("/todos/{id}/delete", post(todos::delete_todo_form))
        .route("/healthz", get(healthz))
}

pub fn app(state: AppState) -> Router {
    page_routes(state.clone())
        .merge(action_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
