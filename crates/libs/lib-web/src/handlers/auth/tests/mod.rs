//! # Auth Handler Tests
//!
//! Test suite for the account lifecycle endpoints, driven through the full
//! API router (session middleware included).

mod register;

use super::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use lib_core::{Config, DbPool};
use serde_json::Value;
use tower::ServiceExt;

pub use crate::test_support::{bearer, create_account, create_verified_account, test_config};

/// Setup test database with schema
pub async fn setup_test_db() -> DbPool {
    crate::test_support::setup_test_db().await
}

/// Create test app with every API route
pub fn test_app(pool: DbPool, config: Config) -> Router {
    let (mut state, _mailer) = crate::test_support::test_state(pool);
    state.config = config;
    crate::server::api_router(state)
}

/// Send a request and decode the JSON body (`Value::Null` when empty).
pub async fn send(app: Router, method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, None, Some(body)).await
}
