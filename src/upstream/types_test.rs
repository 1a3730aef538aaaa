use super::*;

// =============================================================================
// upstream_message
// =============================================================================

#[test]
fn message_reads_detail_field() {
    assert_eq!(upstream_message(401, r#"{"detail":"Incorrect password"}"#), "Incorrect password");
}

#[test]
fn message_reads_message_field() {
    assert_eq!(upstream_message(500, r#"{"message":"database unavailable"}"#), "database unavailable");
}

#[test]
fn message_prefers_detail_over_message() {
    assert_eq!(upstream_message(400, r#"{"detail":"from detail","message":"from message"}"#), "from detail");
}

#[test]
fn message_joins_validation_detail_list() {
    let body = r#"{"detail":[{"loc":["body","title"],"msg":"field required"},{"msg":"too long"}]}"#;
    assert_eq!(upstream_message(422, body), "field required; too long");
}

#[test]
fn message_accepts_bare_json_string() {
    assert_eq!(upstream_message(401, r#""Unauthorized""#), "Unauthorized");
}

#[test]
fn message_accepts_plain_text_body() {
    assert_eq!(upstream_message(409, "Username already registered\n"), "Username already registered");
}

#[test]
fn message_empty_body_falls_back_to_reason() {
    assert_eq!(upstream_message(503, ""), "Service Unavailable");
}

#[test]
fn message_object_without_known_fields_falls_back_to_reason() {
    assert_eq!(upstream_message(404, r#"{"error":"nope"}"#), "Not Found");
}

#[test]
fn message_unknown_status_has_generic_fallback() {
    assert_eq!(upstream_message(599, "  "), "upstream returned status 599");
}

// =============================================================================
// UpstreamReply
// =============================================================================

#[test]
fn reply_success_range() {
    assert!(UpstreamReply::new(200, "").is_success());
    assert!(UpstreamReply::new(204, "").is_success());
    assert!(!UpstreamReply::new(301, "").is_success());
    assert!(!UpstreamReply::new(401, "").is_success());
}

#[test]
fn reply_json_parses_body() {
    let reply = UpstreamReply::new(200, r#"{"access_token":"abc"}"#);
    let value: serde_json::Value = reply.json().unwrap();
    assert_eq!(value["access_token"], "abc");
}

// =============================================================================
// UpstreamRequest
// =============================================================================

#[test]
fn request_builders_set_method_and_body() {
    let req = UpstreamRequest::post("/users/signin", serde_json::json!({"username": "alice"}));
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/users/signin");
    assert!(req.bearer.is_none());
    assert_eq!(req.body.unwrap()["username"], "alice");

    let req = UpstreamRequest::delete("/todos/7").with_bearer("tok");
    assert_eq!(req.method, Method::DELETE);
    assert_eq!(req.bearer.as_deref(), Some("tok"));
    assert!(req.body.is_none());
}
