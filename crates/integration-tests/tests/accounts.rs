//! End-to-end tests for registration, login and profiles.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`teakspice-cli migrate`)
//! - The API server running (`cargo run -p teakspice-api`)

use reqwest::{Method, StatusCode};
use serde_json::json;

use teakspice_integration_tests::Session;

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_register_login_and_profile() {
    let session = Session::new().await;

    assert_eq!(session.user["email"], session.email.as_str());
    assert!(session.user.get("password").is_none());
    assert_eq!(session.token.split('.').count(), 3);

    let (status, profile) = Session::send(session.request(Method::GET, "/api/user/profile")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"], session.user["id"]);
    assert_eq!(profile["phone"], "555-0100");
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_duplicate_email_conflicts() {
    let session = Session::new().await;

    let (status, body) = Session::send(
        session
            .anonymous(Method::POST, "/api/register")
            .json(&json!({
                "name": "Someone Else",
                "email": session.email,
                "password": "another long password",
            })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "An account with this email already exists");
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_login_failures_look_the_same() {
    let session = Session::new().await;

    let (wrong_password, body_a) = Session::send(
        session
            .anonymous(Method::POST, "/api/login")
            .json(&json!({ "email": session.email, "password": "not the password" })),
    )
    .await;
    let (unknown_user, body_b) = Session::send(
        session
            .anonymous(Method::POST, "/api/login")
            .json(&json!({ "email": "nobody-here@example.com", "password": session.password })),
    )
    .await;

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, body_b);
    assert_eq!(body_a["error"], "Invalid credentials");
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_profile_update_ignores_blank_fields() {
    let session = Session::new().await;

    let (status, updated) = Session::send(
        session
            .request(Method::PUT, "/api/user/profile")
            .json(&json!({ "name": "Renamed", "phone": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(updated["phone"], "555-0100");
    assert_eq!(updated["email"], session.email.as_str());
}
