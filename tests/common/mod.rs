// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use vitals_tracker::config::Config;
use vitals_tracker::db::{KvStore, MemoryStore};
use vitals_tracker::routes::create_router;
use vitals_tracker::time_utils::system_clock;
use vitals_tracker::AppState;

/// Check if a Redis server is available via environment variable.
#[allow(dead_code)]
pub fn redis_available() -> bool {
    std::env::var("REDIS_URL").is_ok()
}

/// Skip test with message if Redis is not available.
#[macro_export]
macro_rules! require_redis {
    () => {
        if !crate::common::redis_available() {
            eprintln!("⚠️  Skipping: REDIS_URL not set");
            return;
        }
    };
}

/// Create a test app over a fresh in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Config::test_default(), Arc::new(MemoryStore::new()))
}

/// Create a test app with a specific config and backing store.
#[allow(dead_code)]
pub fn create_test_app_with(config: Config, kv: Arc<dyn KvStore>) -> (Router, Arc<AppState>) {
    let state =
        Arc::new(AppState::new(config, kv, system_clock()).expect("Failed to build app state"));
    (create_router(state.clone()), state)
}

/// Sign a token for `user_id` expiring `expires_in_secs` from now (negative = already expired).
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8], expires_in_secs: i64) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    #[derive(serde::Serialize)]
    struct Claims {
        sub: String,
        exp: i64,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            sub: user_id.to_string(),
            exp: now + expires_in_secs,
        },
        &EncodingKey::from_secret(signing_key),
    )
    .expect("Failed to create JWT")
}

/// Build a request with an optional bearer token and optional JSON body.
#[allow(dead_code)]
pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send one request through a clone of the router.
#[allow(dead_code)]
pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

/// Register a user and return `(token, user_id)`.
#[allow(dead_code)]
pub async fn register_user(app: &Router, email: &str) -> (String, String) {
    let response = send(
        app,
        request(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "email": email,
                "password": "password123",
                "full_name": "Test User",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}

/// Create a health record and return its JSON.
#[allow(dead_code)]
pub async fn create_record(app: &Router, token: &str, record_type: &str, value: f64) -> Value {
    let response = send(
        app,
        request(
            "POST",
            "/health",
            Some(token),
            Some(json!({ "type": record_type, "value": value, "unit": "u" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}
