use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use officeboard::config::Config;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single connection keeps every query on the same in-memory database.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = officeboard::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    officeboard::api::router(state).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_user_crud_lifecycle() {
    let app = spawn_app().await;

    // Empty store lists nothing.
    let (status, body) = send(&app, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Create.
    let (status, created) = send(
        &app,
        "POST",
        "/api/users",
        Some(serde_json::json!({"username": "alice", "email": "a@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["username"], "alice");
    assert_eq!(created["email"], "a@x.com");
    assert!(created["id"].is_i64());
    assert!(created["created_at"].is_string());
    assert!(created["updated_at"].is_string());

    let id = created["id"].as_i64().unwrap();

    // Read back matches.
    let (status, fetched) = send(&app, "GET", &format!("/api/users/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["username"], "alice");
    assert_eq!(fetched["email"], "a@x.com");

    // Duplicate username conflicts; list count unchanged.
    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        Some(serde_json::json!({"username": "alice", "email": "other@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");

    let (_, body) = send(&app, "GET", "/api/users", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Duplicate email conflicts too.
    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(serde_json::json!({"username": "bob", "email": "a@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Delete, then the record is gone.
    let (status, _) = send(&app, "DELETE", &format!("/api/users/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/users/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Delete is not repeatable.
    let (status, body) = send(&app, "DELETE", &format!("/api/users/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_create_user_validation() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        Some(serde_json::json!({"username": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(serde_json::json!({"username": "", "email": "a@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_update_user_semantics() {
    let app = spawn_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(serde_json::json!({"username": "alice", "email": "a@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, bob) = send(
        &app,
        "POST",
        "/api/users",
        Some(serde_json::json!({"username": "bob", "email": "b@x.com"})),
    )
    .await;

    let bob_id = bob["id"].as_i64().unwrap();

    // Username-only update leaves email untouched.
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", bob_id),
        Some(serde_json::json!({"username": "robert"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["username"], "robert");
    assert_eq!(updated["email"], "b@x.com");

    // Colliding username fails and leaves the record fully unmodified,
    // even though the email change alone would have been fine.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", bob_id),
        Some(serde_json::json!({"username": "alice", "email": "new@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already exists");

    let (_, fetched) = send(&app, "GET", &format!("/api/users/{}", bob_id), None).await;
    assert_eq!(fetched["username"], "robert");
    assert_eq!(fetched["email"], "b@x.com");

    // Colliding email is reported as an email conflict.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", bob_id),
        Some(serde_json::json!({"email": "a@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already exists");

    // Re-submitting the current values is not a self-conflict.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", bob_id),
        Some(serde_json::json!({"username": "robert", "email": "b@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Unknown identifier is a 404.
    let (status, _) = send(
        &app,
        "PUT",
        "/api/users/9999",
        Some(serde_json::json!({"username": "nobody"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_body_yields_error_envelope() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/users")
                .header("Content-Type", "application/json")
                .body(Body::from("{\"username\": \"alice\""))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("body must be JSON");
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_update_user_trims_whitespace() {
    let app = spawn_app().await;

    for payload in [
        serde_json::json!({"username": "alice", "email": "a@x.com"}),
        serde_json::json!({"username": "bob", "email": "b@x.com"}),
    ] {
        let (status, _) = send(&app, "POST", "/api/users", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // A padded duplicate is still a duplicate.
    let (status, body) = send(
        &app,
        "PUT",
        "/api/users/2",
        Some(serde_json::json!({"username": "alice "})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already exists");

    // Whitespace-only fields are rejected outright.
    let (status, body) = send(
        &app,
        "PUT",
        "/api/users/2",
        Some(serde_json::json!({"email": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    // A padded fresh value is stored trimmed.
    let (status, updated) = send(
        &app,
        "PUT",
        "/api/users/2",
        Some(serde_json::json!({"username": "  carol  "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["username"], "carol");
}

#[tokio::test]
async fn test_update_without_changes_keeps_updated_at() {
    let app = spawn_app().await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/users",
        Some(serde_json::json!({"username": "alice", "email": "a@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    let original_updated_at = created["updated_at"].as_str().unwrap().to_string();

    // An empty body changes nothing.
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", id),
        Some(serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["updated_at"], original_updated_at);

    // Re-submitting the current values changes nothing either.
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", id),
        Some(serde_json::json!({"username": "alice", "email": "a@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["updated_at"], original_updated_at);

    // A real change does advance the timestamp format-wise; both values
    // stay valid RFC 3339 stamps.
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", id),
        Some(serde_json::json!({"username": "alicia"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_updated_at = updated["updated_at"].as_str().unwrap();
    chrono::DateTime::parse_from_rfc3339(new_updated_at).expect("updated_at must be RFC 3339");
    assert!(new_updated_at >= original_updated_at.as_str());
}

#[tokio::test]
async fn test_calendar_events() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/calendar/events", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 3);

    let titles: Vec<&str> = events
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec!["Team Meeting", "Project Review", "Client Presentation"]
    );

    for event in events {
        let start = chrono::DateTime::parse_from_rfc3339(event["start"].as_str().unwrap())
            .expect("start must be RFC 3339");
        let end = chrono::DateTime::parse_from_rfc3339(event["end"].as_str().unwrap())
            .expect("end must be RFC 3339");
        assert!(end > start);
    }
}

#[tokio::test]
async fn test_weather_input_validation() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/weather/current?lat=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, _) = send(&app, "GET", "/api/weather/current?lat=91&lon=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/weather/current?lat=0&lon=200", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_spa_fallback() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/some/client/route")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with(mime::TEXT_HTML.as_ref()));
}
