//! End-to-end integration tests driving the router in-process

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use book_api::api::create_router;
use book_api::config::{Config, UserEntry};
use book_api::storage::Database;
use book_api::AppState;

fn users() -> Vec<UserEntry> {
    vec![UserEntry {
        password: "admin123".to_string(),
        username: "admin".to_string(),
    }]
}

fn config_with_ttl(session_ttl_seconds: u64) -> Config {
    let mut config = Config::from_lookup(|_| None).unwrap();
    config.tokens.session_ttl_seconds = session_ttl_seconds;
    config
}

fn memory_app(session_ttl_seconds: u64) -> Router {
    let state = AppState::in_memory(config_with_ttl(session_ttl_seconds), &users()).unwrap();
    create_router(Arc::new(state))
}

fn durable_app(session_ttl_seconds: u64) -> (Router, TempDir) {
    let temp = TempDir::new().unwrap();
    let db = Database::open(temp.path()).unwrap();
    let state = AppState::durable(config_with_ttl(session_ttl_seconds), db, &users()).unwrap();
    (create_router(Arc::new(state)), temp)
}

/// One router per backend; the `TempDir` keeps the durable file alive.
fn apps(session_ttl_seconds: u64) -> Vec<(Router, Option<TempDir>)> {
    let (durable, temp) = durable_app(session_ttl_seconds);
    vec![(memory_app(session_ttl_seconds), None), (durable, Some(temp))]
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"username": "admin", "password": "admin123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["message"], "Login successful");
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_book_lifecycle() {
    for (app, _temp) in apps(3600) {
        let token = login(&app).await;
        assert_eq!(token.len(), 32);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/books",
            Some(&token),
            Some(json!({"title": "T", "author": "A", "isbn": "X1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["id"], 1);
        assert_eq!(body["data"]["published_at"], Value::Null);

        let (status, body) = send(&app, Method::GET, "/api/books", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 1);
        assert_eq!(body["data"]["books"][0]["title"], "T");

        let (status, body) =
            send(&app, Method::DELETE, "/api/books/1", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["message"], "Book deleted successfully");

        let (status, body) = send(&app, Method::GET, "/api/books/1", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "fail");
        assert_eq!(body["data"]["message"], "Book not found");
    }
}

#[tokio::test]
async fn test_partial_update() {
    for (app, _temp) in apps(3600) {
        let token = login(&app).await;
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/books",
            Some(&token),
            Some(json!({
                "title": "Clean Code",
                "author": "Robert C. Martin",
                "isbn": "978-0132350884",
                "published_at": "2008-08-01"
            })),
        )
        .await;
        let id = created["data"]["id"].as_u64().unwrap();

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/books/{id}"),
            Some(&token),
            Some(json!({"title": "Clean Code, 2nd ed."})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Clean Code, 2nd ed.");
        assert_eq!(body["data"]["author"], "Robert C. Martin");
        assert_eq!(body["data"]["published_at"], "2008-08-01");
        assert_eq!(body["data"]["created_at"], created["data"]["created_at"]);

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/books/{id}"),
            Some(&token),
            Some(json!({"published_at": "August 2008"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["data"]["message"],
            "Invalid published_at format. Use YYYY-MM-DD"
        );
    }
}

#[tokio::test]
async fn test_update_of_missing_book_is_not_found_before_body_errors() {
    for (app, _temp) in apps(3600) {
        let token = login(&app).await;
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/books",
            Some(&token),
            Some(json!({"title": "T", "author": "A", "isbn": "X1"})),
        )
        .await;
        let uri = format!("/api/books/{}", created["data"]["id"]);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"published_at": "not a date"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["data"]["message"], "Book not found");

        let request = Request::builder()
            .method(Method::PUT)
            .uri(uri.as_str())
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_update_with_bad_body_on_existing_book_is_bad_request() {
    let app = memory_app(3600);
    let token = login(&app).await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(&token),
        Some(json!({"title": "T", "author": "A", "isbn": "X1"})),
    )
    .await;
    let uri = format!("/api/books/{}", created["data"]["id"]);

    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri.as_str())
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_ttl_is_clamped_not_fatal() {
    for (app, _temp) in apps(10_000_000_000_000) {
        let token = login(&app).await;
        let (status, _) = send(&app, Method::GET, "/api/books", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_book_validation_errors() {
    for (app, _temp) in apps(3600) {
        let token = login(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/books",
            Some(&token),
            Some(json!({"author": "A", "isbn": "X1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"]["message"], "title is required");

        let (status, body) =
            send(&app, Method::GET, "/api/books/abc", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"]["message"], "Invalid book ID");

        let book = json!({"title": "T", "author": "A", "isbn": "X1"});
        let (status, _) =
            send(&app, Method::POST, "/api/books", Some(&token), Some(book.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) =
            send(&app, Method::POST, "/api/books", Some(&token), Some(book)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], "fail");
    }
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = memory_app(3600);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejections() {
    for (app, _temp) in apps(3600) {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "admin", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["data"]["message"], "Invalid username or password");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "ghost", "password": "admin123"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "", "password": "admin123"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"]["message"], "username is required");
    }
}

#[tokio::test]
async fn test_auth_gate() {
    for (app, _temp) in apps(3600) {
        let (status, body) = send(&app, Method::GET, "/api/books", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["data"]["message"], "Authorization token is required");

        let (status, body) =
            send(&app, Method::GET, "/api/books", Some("not-a-token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["data"]["message"], "Invalid or expired token");
    }
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    for (app, _temp) in apps(0) {
        let token = login(&app).await;
        let (status, body) = send(&app, Method::GET, "/api/books", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["data"]["message"], "Invalid or expired token");
    }
}

#[tokio::test]
async fn test_logout() {
    for (app, _temp) in apps(3600) {
        let token = login(&app).await;

        let (status, body) = send(&app, Method::POST, "/api/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["message"], "Logout successful");

        let (status, _) = send(&app, Method::GET, "/api/books", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, Method::POST, "/api/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["data"]["message"], "Invalid token");

        let (status, _) = send(&app, Method::POST, "/api/logout", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_method_not_allowed_and_unknown_route() {
    for (app, _temp) in apps(3600) {
        let (status, body) = send(&app, Method::GET, "/api/login", None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["data"]["message"], "Method not allowed");

        let token = login(&app).await;
        let (status, _) = send(&app, Method::PATCH, "/api/books", Some(&token), None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, body) = send(&app, Method::GET, "/api/authors", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "fail");
    }
}

#[tokio::test]
async fn test_health() {
    let app = memory_app(3600);
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["backend"], "memory");

    let (app, _temp) = durable_app(3600);
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "connected");
    assert_eq!(body["data"]["backend"], "durable");
}

#[tokio::test]
async fn test_durable_books_survive_restart() {
    let temp = TempDir::new().unwrap();
    {
        let db = Database::open(temp.path()).unwrap();
        let state = AppState::durable(config_with_ttl(3600), db, &users()).unwrap();
        let app = create_router(Arc::new(state));
        let token = login(&app).await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/books",
            Some(&token),
            Some(json!({"title": "Kept", "author": "A", "isbn": "K1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let db = Database::open(temp.path()).unwrap();
    let state = AppState::durable(config_with_ttl(3600), db, &users()).unwrap();
    let app = create_router(Arc::new(state));
    let token = login(&app).await;
    let (_, body) = send(&app, Method::GET, "/api/books", Some(&token), None).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["books"][0]["title"], "Kept");
}
