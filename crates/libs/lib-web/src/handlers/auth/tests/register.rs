//! # Registration Tests

use super::*;
use lib_core::model::store::{AccountRepository, TokenKind, TokenRepository};
use serde_json::json;

fn registration(email: &str) -> Value {
    json!({
        "first_name": "Kofi",
        "last_name": "Boateng",
        "email": email,
        "password": "Secret!",
        "confirm_password": "Secret!"
    })
}

#[tokio::test]
async fn test_register_success() {
    // Arrange
    let pool = setup_test_db().await;
    let app = test_app(pool.clone(), test_config());

    // Act
    let (status, body) = post_json(app, "/api/auth/register", registration("Kofi@Example.com")).await;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    let response: RegisterResponse = serde_json::from_value(body).unwrap();
    assert_eq!(response.account.email, "kofi@example.com");
    assert!(!response.account.email_verified);

    let token = TokenRepository::find_by_email(&pool, TokenKind::Verification, "kofi@example.com")
        .await
        .unwrap();
    assert!(token.is_some());
}

#[tokio::test]
async fn test_register_never_returns_password_hash() {
    let pool = setup_test_db().await;
    let app = test_app(pool, test_config());

    let (_, body) = post_json(app, "/api/auth/register", registration("hash@example.com")).await;

    let text = body.to_string();
    assert!(!text.contains("password"));
    assert!(!text.contains("$argon2"));
}

#[tokio::test]
async fn test_register_reports_every_invalid_field() {
    let pool = setup_test_db().await;
    let app = test_app(pool, test_config());

    let (status, body) = post_json(
        app,
        "/api/auth/register",
        json!({
            "first_name": " ",
            "last_name": "Boateng",
            "email": "not-an-email",
            "password": "weak",
            "confirm_password": "different"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "Validation");
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    for expected in ["first_name", "email", "password", "confirm_password"] {
        assert!(fields.contains(&expected), "missing {expected} in {fields:?}");
    }
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let pool = setup_test_db().await;
    create_account(&pool, "taken@example.com", "Secret!", lib_core::model::store::models::Role::User).await;
    let app = test_app(pool.clone(), test_config());

    let (status, body) = post_json(app, "/api/auth/register", registration("TAKEN@example.com")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "Conflict");
    assert_eq!(AccountRepository::count(&pool).await.unwrap(), 1);
}
