use reqwest::Method;
use serde_json::json;

use super::*;
use crate::state::test_helpers::MockUpstream;
use crate::upstream::UpstreamReply;

fn input(title: &str, description: &str) -> TodoInput {
    TodoInput { title: title.into(), description: description.into(), completed: false }
}

// =============================================================================
// TodoInput::validate
// =============================================================================

#[test]
fn validate_trims_fields() {
    let ok = input("  buy milk ", " two litres ").validate().unwrap();
    assert_eq!(ok.title, "buy milk");
    assert_eq!(ok.description, "two litres");
}

#[test]
fn validate_rejects_blank_title() {
    let err = input("   ", "desc").validate().unwrap_err();
    assert_eq!(err, TodoError::Validation("title is required".into()));
}

#[test]
fn validate_rejects_blank_description() {
    let err = input("title", "").validate().unwrap_err();
    assert_eq!(err, TodoError::Validation("description is required".into()));
}

#[test]
fn validate_accepts_exactly_max_chars() {
    let title = "é".repeat(TODO_FIELD_MAX_CHARS);
    assert!(input(&title, "d").validate().is_ok());
}

#[test]
fn validate_rejects_over_max_chars() {
    let title = "x".repeat(TODO_FIELD_MAX_CHARS + 1);
    assert!(matches!(input(&title, "d").validate(), Err(TodoError::Validation(_))));
}

#[test]
fn input_completed_defaults_false() {
    let parsed: TodoInput = serde_json::from_str(r#"{"title":"a","description":"b"}"#).unwrap();
    assert!(!parsed.completed);
}

// =============================================================================
// Todo deserialization
// =============================================================================

#[test]
fn todo_null_fields_read_as_defaults() {
    let todo: Todo = serde_json::from_str(r#"{"id":3,"title":"t","description":null,"completed":null}"#).unwrap();
    assert_eq!(todo.description, "");
    assert!(!todo.completed);
}

#[test]
fn todo_ignores_timestamps() {
    let todo: Todo = serde_json::from_str(
        r#"{"id":3,"title":"t","description":"d","completed":true,"created_at":"2024-01-01T00:00:00","updated_at":"2024-01-01T00:00:00"}"#,
    )
    .unwrap();
    assert_eq!(todo, Todo { id: 3, title: "t".into(), description: "d".into(), completed: true });
}

// =============================================================================
// operations
// =============================================================================

#[tokio::test]
async fn list_without_token_makes_no_call() {
    let mock = MockUpstream::silent();
    let err = list(&*mock, "").await.unwrap_err();
    assert_eq!(err, TodoError::Unauthorized);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn list_sends_bearer_and_parses() {
    let mock = MockUpstream::replying(200, json!([{"id":1,"title":"a","description":"b","completed":false}]));
    let todos = list(&*mock, "acc").await.unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "a");

    let requests = mock.requests();
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].path, "/todos");
    assert_eq!(requests[0].bearer.as_deref(), Some("acc"));
}

#[tokio::test]
async fn upstream_401_is_unauthorized() {
    let mock = MockUpstream::replying(401, json!({"detail": "Could not validate credentials"}));
    let err = list(&*mock, "expired").await.unwrap_err();
    assert_eq!(err, TodoError::Unauthorized);
}

#[tokio::test]
async fn upstream_failure_message_is_verbatim() {
    let mock = MockUpstream::replying(404, json!({"detail": "Todo not found"}));
    let err = update(&*mock, "acc", 9, &input("a", "b")).await.unwrap_err();
    assert_eq!(err, TodoError::Upstream { message: "Todo not found".into() });
}

#[tokio::test]
async fn create_posts_body() {
    let mock = MockUpstream::replying(201, json!({"id":5,"title":"a","description":"b","completed":false}));
    let todo = create(&*mock, "acc", &input("a", "b")).await.unwrap();
    assert_eq!(todo.id, 5);

    let body = mock.requests()[0].body.clone().unwrap();
    assert_eq!(body, json!({"title":"a","description":"b","completed":false}));
}

#[tokio::test]
async fn update_targets_id() {
    let mock = MockUpstream::replying(200, json!({"id":9,"title":"a","description":"b","completed":true}));
    let todo = update(&*mock, "acc", 9, &TodoInput { completed: true, ..input("a", "b") })
        .await
        .unwrap();
    assert!(todo.completed);
    let requests = mock.requests();
    assert_eq!(requests[0].method, Method::PUT);
    assert_eq!(requests[0].path, "/todos/9");
}

#[tokio::test]
async fn delete_accepts_empty_204() {
    let mock = MockUpstream::new(vec![Ok(UpstreamReply::new(204, ""))]);
    delete(&*mock, "acc", 4).await.unwrap();
    assert_eq!(mock.requests()[0].path, "/todos/4");
}

#[tokio::test]
async fn transport_error_is_upstream_error() {
    let mock = MockUpstream::new(vec![Err(UpstreamError::Timeout)]);
    let err = list(&*mock, "acc").await.unwrap_err();
    assert_eq!(err, TodoError::Upstream { message: "upstream request timed out".into() });
}

#[tokio::test]
async fn malformed_success_body_is_upstream_error() {
    let mock = MockUpstream::new(vec![Ok(UpstreamReply::new(200, "<html>"))]);
    assert!(matches!(list(&*mock, "acc").await, Err(TodoError::Upstream { .. })));
}
