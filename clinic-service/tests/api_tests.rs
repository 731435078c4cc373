mod common;

use auth::Claims;
use auth::JwtHandler;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use chrono::Utc;
use common::TestApp;
use common::JWT_SECRET;
use reqwest::StatusCode;
use serde_json::json;

async fn error_message(response: reqwest::Response) -> String {
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    body["data"]["message"]
        .as_str()
        .expect("Missing message")
        .to_string()
}

#[tokio::test]
async fn test_register_login_and_access_protected_route() {
    let app = TestApp::spawn().await;

    let registered = app.register("alice@example.com", "hunter22").await;
    let registered_claims = app
        .authenticator
        .validate_token(&registered)
        .expect("Registration token should validate");

    let response = app
        .post("/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "hunter22" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 200);
    let token = body["data"]["token"].as_str().expect("Missing token");
    let claims = app
        .authenticator
        .validate_token(token)
        .expect("Login token should validate");
    assert_eq!(claims.sub, registered_claims.sub);

    let response = app
        .get_authenticated("/auth/me", token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["id"], claims.sub);
    assert_eq!(body["data"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;
    app.register("alice@example.com", "hunter22").await;

    let response = app
        .post("/auth/register")
        .json(&json!({ "email": "alice@example.com", "password": "other" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(error_message(response).await, "email already registered");
}

#[tokio::test]
async fn test_register_rejects_missing_and_malformed_fields() {
    let app = TestApp::spawn().await;

    let bodies = [
        json!({ "email": "", "password": "hunter22" }),
        json!({ "email": "alice@example.com", "password": "" }),
        json!({ "password": "hunter22" }),
        json!({ "email": "not-an-email", "password": "hunter22" }),
    ];

    for body in bodies {
        let response = app
            .post("/auth/register")
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", body);
    }
}

#[tokio::test]
async fn test_register_rejects_mistyped_field_with_envelope() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({ "email": 123, "password": "hunter22" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 400);
    assert!(body["data"]["message"].is_string());
}

#[tokio::test]
async fn test_unreadable_bodies_are_bad_requests() {
    let app = TestApp::spawn().await;

    let form = app
        .post("/auth/login")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("email=alice%40example.com&password=hunter22")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(form.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = form.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 400);

    let syntax = app
        .post("/auth/register")
        .header("Content-Type", "application/json")
        .body("{\"email\": ")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(syntax.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = syntax.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 400);
}

#[tokio::test]
async fn test_login_rejects_missing_fields() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/login")
        .json(&json!({ "email": "alice@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_byte_identical() {
    let app = TestApp::spawn().await;
    app.register("alice@example.com", "hunter22").await;

    let wrong_password = app
        .post("/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to execute request");
    let unknown_email = app
        .post("/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.status(), unknown_email.status());

    let wrong_password = wrong_password.bytes().await.unwrap();
    let unknown_email = unknown_email.bytes().await.unwrap();
    assert_eq!(wrong_password, unknown_email);

    let body: serde_json::Value = serde_json::from_slice(&wrong_password).unwrap();
    assert_eq!(body["data"]["message"], "invalid credentials");
}

#[tokio::test]
async fn test_protected_route_requires_bearer_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/auth/me")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(response).await, "missing bearer token");

    let response = app
        .get("/auth/me")
        .header("Authorization", "Token abc")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_message(response).await,
        "invalid authorization header format"
    );
}

#[tokio::test]
async fn test_rejected_tokens_share_one_message() {
    let app = TestApp::spawn().await;
    let token = app.register("alice@example.com", "hunter22").await;

    let expired = JwtHandler::new(JWT_SECRET)
        .encode(&Claims::issued_at(
            1,
            "alice@example.com",
            Utc::now() - Duration::hours(25),
            24,
        ))
        .unwrap();

    let foreign = JwtHandler::new(b"some-other-secret-of-sufficient-length")
        .encode(&Claims::for_user(1, "alice@example.com", 24))
        .unwrap();

    // Same payload and signature, header claims RS256
    let (_, rest) = token.split_once('.').unwrap();
    let rs256 = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
        rest
    );

    let string_subject = JwtHandler::new(JWT_SECRET)
        .encode(&json!({
            "sub": "1",
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + 3600,
        }))
        .unwrap();

    let tampered = format!("{}x", token);

    for bad in [tampered, expired, foreign, rs256, string_subject] {
        let response = app
            .get_authenticated("/auth/me", &bad)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_message(response).await, "invalid token");
    }
}

#[tokio::test]
async fn test_concurrent_requests_keep_their_own_identity() {
    let app = TestApp::spawn().await;

    let mut tokens = Vec::new();
    for i in 0..16 {
        let email = format!("user{}@example.com", i);
        let token = app.register(&email, "hunter22").await;
        tokens.push((email, token));
    }

    let requests = tokens.iter().map(|(email, token)| {
        let app = &app;
        async move {
            let response = app
                .get_authenticated("/auth/me", token)
                .send()
                .await
                .expect("Failed to execute request");
            let body: serde_json::Value =
                response.json().await.expect("Failed to parse response");
            (email.clone(), body["data"]["email"].as_str().map(str::to_string))
        }
    });

    for (expected, actual) in futures::future::join_all(requests).await {
        assert_eq!(actual.as_deref(), Some(expected.as_str()));
    }
}

#[tokio::test]
async fn test_audit_entries_attributed_to_caller() {
    let app = TestApp::spawn().await;
    let token = app.register("alice@example.com", "hunter22").await;
    let user_id = app.authenticator.validate_token(&token).unwrap().sub;

    let response = app
        .get_authenticated("/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let entry = app
        .logs
        .wait_for(|entry| entry.message == "Fetching current user")
        .await;

    assert_eq!(entry.user_id, Some(user_id));
    assert_eq!(entry.user_email.as_deref(), Some("alice@example.com"));
    assert_eq!(entry.function, "get_current_user");
    assert!(entry.file.starts_with("me.rs"));
}

#[tokio::test]
async fn test_preflight_is_not_authenticated() {
    let app = TestApp::spawn().await;

    let response = app
        .api_client
        .request(reqwest::Method::OPTIONS, format!("{}/auth/me", app.address))
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "GET")
        .send()
        .await
        .expect("Failed to execute request");

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}
