//! Auth routes: form actions for the login page plus the JSON login used by
//! script clients.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::guard::{HOME_PATH, LOGIN_PATH};
use crate::routes::pages::{Notice, render_login};
use crate::services::auth::{self, AuthError, LoginForm, SignupForm};
use crate::state::AppState;

#[derive(Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub token_type: String,
}

#[derive(Serialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

#[must_use]
pub fn auth_error_to_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials(_) | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
        AuthError::Conflict(_) => StatusCode::CONFLICT,
        AuthError::Upstream { .. } => StatusCode::BAD_GATEWAY,
    }
}

fn login_failure(err: &AuthError) -> Response {
    let page = render_login(Some(&Notice::Error(err.to_string())));
    (auth_error_to_status(err), Html(page)).into_response()
}

/// `POST /auth/login`
pub async fn login_action(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    if let Err(e) = form.validate() {
        return login_failure(&e);
    }
    match auth::login(state.upstream.as_ref(), jar, state.cookie_policy(), &form.username, &form.password).await {
        Ok((jar, _)) => (jar, Redirect::to(HOME_PATH)).into_response(),
        Err(e) => {
            tracing::info!(error = %e, "login rejected");
            login_failure(&e)
        }
    }
}

/// `POST /auth/signup`: registers only; the user logs in afterwards.
pub async fn signup_action(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    if let Err(e) = form.validate() {
        return login_failure(&e);
    }
    match auth::signup(state.upstream.as_ref(), form.username.trim(), form.email.trim(), &form.password).await {
        Ok(user) => {
            let notice = Notice::Info(format!("Account created for {}. Please log in.", user.username));
            Html(render_login(Some(&notice))).into_response()
        }
        Err(e) => {
            tracing::info!(error = %e, "signup rejected");
            login_failure(&e)
        }
    }
}

/// `POST /auth/logout`
pub async fn logout_action(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    (auth::logout(jar, state.cookie_policy()), Redirect::to(LOGIN_PATH))
}

/// `POST /fast/login`: JSON body in, session cookies plus a JSON summary out.
pub async fn login_json(State(state): State<AppState>, jar: CookieJar, Json(form): Json<LoginForm>) -> Response {
    match auth::login(state.upstream.as_ref(), jar, state.cookie_policy(), &form.username, &form.password).await {
        Ok((jar, session)) => {
            let body = LoginResponse { username: session.username, token_type: session.token_type };
            (jar, Json(body)).into_response()
        }
        Err(e) => (auth_error_to_status(&e), Json(ErrorBody { message: e.to_string() })).into_response(),
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
