//! Server-rendered pages: the todo list at `/` and the login/signup forms
//! at `/login`. Both sit behind the route guard.

use std::fmt::Write;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum_extra::extract::cookie::CookieJar;

use crate::services::session;
use crate::services::todo::{self, Todo};
use crate::state::AppState;

/// One-shot message shown above a page, the equivalent of a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /`: todo list for the signed-in user, or a sign-in prompt.
pub async fn home(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    home_page(&state, &jar, None).await
}

/// `GET /login`: login and signup forms.
pub async fn login_page() -> Html<String> {
    Html(render_login(None))
}

/// Fallback for unmatched paths that made it past the guard.
pub async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(layout("Not found", None, "<p>Page not found.</p>")))
}

/// Render the home page for the current session. A failed list fetch
/// renders an empty list rather than an error page.
pub(crate) async fn home_page(state: &AppState, jar: &CookieJar, notice: Option<&Notice>) -> Html<String> {
    let current = session::read(jar);
    let username = Some(current.username.as_str()).filter(|u| !u.is_empty());

    if current.access_token.is_empty() {
        return Html(render_home(username, None, notice));
    }

    let todos = match todo::list(state.upstream.as_ref(), &current.access_token).await {
        Ok(todos) => todos,
        Err(e) => {
            tracing::warn!(error = %e, "todo list fetch failed");
            Vec::new()
        }
    };
    Html(render_home(username, Some(todos.as_slice()), notice))
}

// =============================================================================
// RENDERING
// =============================================================================

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, username: Option<&str>, body: &str) -> String {
    let nav = match username {
        Some(name) => format!(
            r#"<span>Signed in as {}</span>
<form method="post" action="/auth/logout"><button type="submit">Log out</button></form>"#,
            escape_html(name)
        ),
        None => r#"<a href="/login">Log in</a>"#.to_owned(),
    };
    format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{title} · FastTodo</title></head>
<body>
<header><a href="/">FastTodo</a> <nav>{nav}</nav></header>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape_html(title),
    )
}

fn render_notice(notice: Option<&Notice>) -> String {
    match notice {
        Some(Notice::Info(text)) => format!(r#"<p class="notice" role="status">{}</p>"#, escape_html(text)),
        Some(Notice::Error(text)) => format!(r#"<p class="notice error" role="alert">{}</p>"#, escape_html(text)),
        None => String::new(),
    }
}

/// `todos` is `None` when nobody is signed in.
pub(crate) fn render_home(username: Option<&str>, todos: Option<&[Todo]>, notice: Option<&Notice>) -> String {
    let mut body = render_notice(notice);

    body.push_str(
        r#"<section>
<h2>Create Todos</h2>
<form method="post" action="/todos">
<label>Title <input name="title" maxlength="100" required></label>
<label>Description <textarea name="description" maxlength="100" required></textarea></label>
<button type="submit">Create Todo</button>
</form>
</section>
"#,
    );

    body.push_str("<section>\n<h2>ToDos List</h2>\n");
    match todos {
        None => body.push_str(
            r#"<p>Please <a href="/login">login</a> or <a href="/login">create account</a> to create &amp; save Todos</p>"#,
        ),
        Some([]) => body.push_str("<p>No todos yet.</p>"),
        Some(todos) => {
            body.push_str("<table>\n<thead><tr><th>Title</th><th>Description</th><th>Done</th><th></th></tr></thead>\n<tbody>\n");
            for item in todos {
                render_todo_row(&mut body, item);
            }
            body.push_str("</tbody>\n</table>");
        }
    }
    body.push_str("\n</section>");

    layout("Todos", username, &body)
}

fn render_todo_row(out: &mut String, item: &Todo) {
    let title = escape_html(&item.title);
    let description = escape_html(&item.description);
    let checked = if item.completed { " checked" } else { "" };
    let form_id = format!("todo-{}", item.id);
    let _ = write!(
        out,
        r#"<tr>
<td><input form="{form_id}" name="title" value="{title}" maxlength="100" required></td>
<td><input form="{form_id}" name="description" value="{description}" maxlength="100" required></td>
<td><input form="{form_id}" type="checkbox" name="completed"{checked}></td>
<td>
<form id="{form_id}" method="post" action="/todos/{id}"><button type="submit">Save</button></form>
<form method="post" action="/todos/{id}/delete"><button type="submit">Delete</button></form>
</td>
</tr>
"#,
        id = item.id,
    );
}

pub(crate) fn render_login(notice: Option<&Notice>) -> String {
    let body = format!(
        r#"{notice}
<section>
<h2>Login</h2>
<form method="post" action="/auth/login">
<label>Username <input name="username" minlength="3" required autocomplete="username"></label>
<label>Password <input name="password" type="password" minlength="3" required autocomplete="current-password"></label>
<button type="submit">Login</button>
</form>
</section>
<section>
<h2>Create account</h2>
<form method="post" action="/auth/signup">
<label>Username <input name="username" minlength="3" maxlength="100" required autocomplete="username"></label>
<label>Email <input name="email" type="email" required autocomplete="email"></label>
<label>Password <input name="password" type="password" minlength="6" required autocomplete="new-password"></label>
<label>Confirm password <input name="confirm_password" type="password" minlength="6" required autocomplete="new-password"></label>
<button type="submit">Sign up</button>
</form>
</section>"#,
        notice = render_notice(notice),
    );
    layout("Login", None, &body)
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
