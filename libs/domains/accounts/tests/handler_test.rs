//! Handler tests for the Accounts domain
//!
//! These tests verify that HTTP handlers work correctly:
//! - Request deserialization (JSON → Rust structs)
//! - Response serialization (Rust structs → JSON)
//! - HTTP status codes
//! - Session cookie issuance and principal resolution

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use domain_accounts::*;
use domain_notifications::MemoryMailer;
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()

struct TestApp {
    app: Router,
    repo: InMemoryUserRepository,
    mailer: Arc<MemoryMailer>,
}

fn test_app() -> TestApp {
    let repo = InMemoryUserRepository::new();
    let mailer = Arc::new(MemoryMailer::new());
    let service = UserService::new(
        repo.clone(),
        mailer.clone(),
        "http://localhost:8080".to_string(),
    );
    let app = handlers::router(service, InMemorySessionStore::new(), false);

    TestApp { app, repo, mailer }
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_body(email: &str) -> String {
    serde_json::to_string(&json!({
        "email": email,
        "username": "testuser",
        "first_name": "Test",
        "last_name": "User",
        "password": "Password123!",
        "password_confirm": "Password123!"
    }))
    .unwrap()
}

async fn register(app: &TestApp, email: &str) -> UserResponse {
    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header("content-type", "application/json")
        .body(Body::from(register_body(email)))
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

/// Login and return the session cookie ("session=<token>")
async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({ "email": email, "password": password })).unwrap(),
        ))
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set a session cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("HttpOnly"));

    set_cookie
        .split(';')
        .next()
        .unwrap()
        .trim()
        .to_string()
}

async fn promote_to_admin(app: &TestApp, id: uuid::Uuid) {
    let mut user = app.repo.get_by_id(id).await.unwrap().unwrap();
    user.role = Role::Admin;
    app.repo.update(user).await.unwrap();
}

#[tokio::test]
async fn test_register_returns_201_and_sends_email() {
    let app = test_app();

    let user = register(&app, "new@example.com").await;
    assert_eq!(user.email, "new@example.com");
    assert!(!user.is_verified);

    let outbox = app.mailer.outbox().await;
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].to, "new@example.com");
}

#[tokio::test]
async fn test_register_validates_input() {
    let app = test_app();

    // Invalid email address
    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": "not-an-email",
                "username": "testuser",
                "first_name": "Test",
                "last_name": "User",
                "password": "Password123!",
                "password_confirm": "Password123!"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_endpoint() {
    let app = test_app();
    let created = register(&app, "new@example.com").await;

    let token = app
        .repo
        .get_by_id(created.id)
        .await
        .unwrap()
        .unwrap()
        .verification_token;

    let request = Request::builder()
        .uri(format!("/verify/{}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let user: UserResponse = json_body(response.into_body()).await;
    assert!(user.is_verified);
}

#[tokio::test]
async fn test_verify_unknown_token_returns_404() {
    let app = test_app();
    register(&app, "new@example.com").await;

    let request = Request::builder()
        .uri(format!("/verify/{}", uuid::Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_bad_password_returns_401() {
    let app = test_app();
    register(&app, "me@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": "me@example.com",
                "password": "Wrong123!"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_round_trip() {
    let app = test_app();
    register(&app, "me@example.com").await;
    let cookie = login(&app, "me@example.com", "Password123!").await;

    // Read the profile
    let request = Request::builder()
        .uri("/profile")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Update it
    let request = Request::builder()
        .method("PUT")
        .uri("/profile")
        .header("content-type", "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from(
            serde_json::to_string(&json!({ "first_name": "Changed", "bio": "Hello" })).unwrap(),
        ))
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let user: UserResponse = json_body(response.into_body()).await;
    assert_eq!(user.first_name, "Changed");
    assert_eq!(user.bio.as_deref(), Some("Hello"));
}

#[tokio::test]
async fn test_profile_without_session_returns_401() {
    let app = test_app();

    let request = Request::builder()
        .uri("/profile")
        .body(Body::empty())
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = test_app();
    register(&app, "me@example.com").await;
    let cookie = login(&app, "me@example.com", "Password123!").await;

    let request = Request::builder()
        .method("POST")
        .uri("/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The old cookie no longer resolves
    let request = Request::builder()
        .uri("/profile")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_endpoint() {
    let app = test_app();
    register(&app, "me@example.com").await;
    let cookie = login(&app, "me@example.com", "Password123!").await;

    let request = Request::builder()
        .method("POST")
        .uri("/change-password")
        .header("content-type", "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from(
            serde_json::to_string(&json!({
                "current_password": "Password123!",
                "new_password": "NewPassword456!"
            }))
            .unwrap(),
        ))
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // New password works
    login(&app, "me@example.com", "NewPassword456!").await;
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_regular_users() {
    let app = test_app();
    register(&app, "regular@example.com").await;
    let cookie = login(&app, "regular@example.com", "Password123!").await;

    let request = Request::builder()
        .uri("/admin/users")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_listing_with_page_param() {
    let app = test_app();
    let admin = register(&app, "admin@example.com").await;
    promote_to_admin(&app, admin.id).await;

    for i in 0..14 {
        register(&app, &format!("user{}@example.com", i)).await;
    }

    let cookie = login(&app, "admin@example.com", "Password123!").await;

    let request = Request::builder()
        .uri("/admin/users?page=2")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page: serde_json::Value = json_body(response.into_body()).await;
    assert_eq!(page["page"], 2);
    assert_eq!(page["total_items"], 15);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 5);

    // Out-of-range page is clamped
    let request = Request::builder()
        .uri("/admin/users?page=99")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    let page: serde_json::Value = json_body(response.into_body()).await;
    assert_eq!(page["page"], 2);
}

#[tokio::test]
async fn test_admin_update_and_delete_user() {
    let app = test_app();
    let admin = register(&app, "admin@example.com").await;
    promote_to_admin(&app, admin.id).await;
    let target = register(&app, "target@example.com").await;

    let cookie = login(&app, "admin@example.com", "Password123!").await;

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/admin/users/{}", target.id))
        .header("content-type", "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from(
            serde_json::to_string(&json!({ "is_verified": true })).unwrap(),
        ))
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let user: UserResponse = json_body(response.into_body()).await;
    assert!(user.is_verified);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/admin/users/{}", target.id))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = Request::builder()
        .uri(format!("/admin/users/{}", target.id))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
