use serde_json::json;

use super::*;
use crate::state::test_helpers::{MockUpstream, request_jar, test_app_state};

fn todo(id: i64, title: &str, completed: bool) -> Todo {
    Todo { id, title: title.into(), description: "desc".into(), completed }
}

#[test]
fn escape_html_covers_markup_characters() {
    assert_eq!(escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
    assert_eq!(escape_html("plain"), "plain");
}

#[test]
fn anonymous_home_prompts_for_login() {
    let html = render_home(None, None, None);
    assert!(html.contains("Please <a href=\"/login\">login</a>"));
    assert!(html.contains(r#"action="/todos""#));
    assert!(!html.contains("/auth/logout"));
}

#[test]
fn signed_in_home_lists_todos_with_edit_and_delete_forms() {
    let todos = [todo(7, "Buy milk", true), todo(8, "Walk dog", false)];
    let html = render_home(Some("alice"), Some(&todos[..]), None);

    assert!(html.contains("Signed in as alice"));
    assert!(html.contains(r#"action="/auth/logout""#));
    assert!(html.contains(r#"action="/todos/7""#));
    assert!(html.contains(r#"action="/todos/8/delete""#));
    assert!(html.contains(r#"form="todo-7" type="checkbox" name="completed" checked"#));
    assert!(html.contains(r#"form="todo-8" type="checkbox" name="completed">"#));
}

#[test]
fn empty_list_has_placeholder() {
    let html = render_home(Some("alice"), Some(&[][..]), None);
    assert!(html.contains("No todos yet."));
}

#[test]
fn todo_text_is_escaped() {
    let todos = [todo(1, "<script>alert(1)</script>", false)];
    let html = render_home(Some("alice"), Some(&todos[..]), None);
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn notices_render_with_role() {
    let html = render_login(Some(&Notice::Error("Incorrect password".into())));
    assert!(html.contains(r#"role="alert">Incorrect password"#));

    let html = render_login(Some(&Notice::Info("Account created".into())));
    assert!(html.contains(r#"role="status">Account created"#));
}

#[test]
fn login_page_has_both_forms() {
    let html = render_login(None);
    assert!(html.contains(r#"action="/auth/login""#));
    assert!(html.contains(r#"action="/auth/signup""#));
    assert!(html.contains(r#"name="confirm_password""#));
}

#[tokio::test]
async fn home_page_without_token_makes_no_upstream_call() {
    let mock = MockUpstream::silent();
    let state = test_app_state(mock.clone());
    let Html(html) = home_page(&state, &request_jar(&[]), None).await;
    assert!(html.contains("Please <a href=\"/login\">login</a>"));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn home_page_lists_upstream_todos_with_bearer() {
    let mock = MockUpstream::replying(200, json!([{"id": 3, "title": "Read", "description": null, "completed": false}]));
    let state = test_app_state(mock.clone());
    let jar = request_jar(&[("access_token", "acc"), ("username", "alice")]);

    let Html(html) = home_page(&state, &jar, None).await;
    assert!(html.contains(r#"value="Read""#));
    assert!(html.contains("Signed in as alice"));

    let requests = mock.requests();
    assert_eq!(requests[0].path, "/todos");
    assert_eq!(requests[0].bearer.as_deref(), Some("acc"));
}

#[tokio::test]
async fn home_page_upstream_failure_renders_empty_list() {
    let mock = MockUpstream::replying(500, json!({"detail": "boom"}));
    let state = test_app_state(mock);
    let jar = request_jar(&[("access_token", "acc")]);

    let Html(html) = home_page(&state, &jar, None).await;
    assert!(html.contains("No todos yet."));
}

#[tokio::test]
async fn not_found_is_404() {
    let (status, _) = not_found().await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
