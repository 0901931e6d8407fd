use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use study_server::{AppState, router};
use tower::ServiceExt;

//===============
// Test Helpers
//===============

fn app() -> Router {
    router(AppState::in_memory())
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

fn task_body(user: u64, title: &str, due: &str) -> Value {
    json!({
        "userId": user,
        "subjectId": 1,
        "title": title,
        "priority": "high",
        "dueDate": due,
        "estimatedTime": 45
    })
}

//===============
// Tests
//===============

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(&app(), request(Method::GET, "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));
}

#[tokio::test]
async fn users_are_created_once_and_fetched_by_id() {
    let app = app();
    let user = json!({
        "username": "ada",
        "password": "pw",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com"
    });

    let (status, created) = send(&app, request(Method::POST, "/api/users", Some(user.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);

    let (status, body) = send(&app, request(Method::POST, "/api/users", Some(user))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already exists");

    let (status, fetched) = send(&app, request(Method::GET, "/api/users/1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["username"], "ada");

    let (status, body) = send(&app, request(Method::GET, "/api/users/9", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn duplicate_email_is_not_reported_as_username_conflict() {
    let app = app();
    let user = |username: &str| {
        json!({
            "username": username,
            "password": "pw",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com"
        })
    };

    let (status, _) = send(&app, request(Method::POST, "/api/users", Some(user("ada")))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, request(Method::POST, "/api/users", Some(user("lovelace")))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username or email already exists");
}

#[tokio::test]
async fn listing_requires_numeric_user_id() {
    let app = app();
    for uri in ["/api/subjects", "/api/tasks?userId=abc", "/api/study-sessions?userId="] {
        let (status, body) = send(&app, request(Method::GET, uri, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "Invalid user ID");
    }
}

#[tokio::test]
async fn task_lifecycle_over_http() {
    let app = app();

    let (status, first) = send(
        &app,
        request(Method::POST, "/api/tasks", Some(task_body(1, "Essay", "2024-03-05"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["id"], 1);
    assert_eq!(first["completed"], false);

    send(
        &app,
        request(Method::POST, "/api/tasks", Some(task_body(2, "Other", "2024-03-06"))),
    )
    .await;

    let (status, list) = send(&app, request(Method::GET, "/api/tasks?userId=1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (status, updated) = send(
        &app,
        request(Method::PUT, "/api/tasks/1", Some(json!({ "completed": true }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], "Essay");

    let (status, body) = send(&app, request(Method::DELETE, "/api/tasks/1", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, request(Method::DELETE, "/api/tasks/1", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
}

#[tokio::test]
async fn invalid_bodies_are_rejected() {
    let app = app();

    let (status, body) = send(
        &app,
        request(Method::POST, "/api/subjects", Some(json!({ "userId": 1 }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/subjects",
            Some(json!({ "userId": 1, "name": "  ", "color": "blue" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name cannot be empty");

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            "/api/study-sessions/3",
            Some(json!({ "title": "Late review" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Study session not found");

    let (status, _) = send(
        &app,
        request(Method::DELETE, "/api/subjects/not-a-number", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn time_records_filter_only_with_both_bounds() {
    let app = app();
    for (date, minutes) in [("2024-03-01", 30), ("2024-03-04", 45), ("2024-03-09", 20)] {
        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/study-time-records",
                Some(json!({
                    "userId": 1,
                    "subjectId": 2,
                    "date": date,
                    "duration": minutes,
                    "focusScore": 80
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let count = |value: &Value| value.as_array().map(Vec::len);

    let (_, all) = send(
        &app,
        request(Method::GET, "/api/study-time-records?userId=1", None),
    )
    .await;
    assert_eq!(count(&all), Some(3));

    let (_, ranged) = send(
        &app,
        request(
            Method::GET,
            "/api/study-time-records?userId=1&startDate=2024-03-01&endDate=2024-03-04",
            None,
        ),
    )
    .await;
    assert_eq!(count(&ranged), Some(2));

    let (_, half_open) = send(
        &app,
        request(
            Method::GET,
            "/api/study-time-records?userId=1&startDate=2024-03-05",
            None,
        ),
    )
    .await;
    assert_eq!(count(&half_open), Some(3));

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/study-time-records",
            Some(json!({ "userId": 1, "subjectId": 2, "date": "2024-03-01", "duration": 0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "duration must be > 0");
}
