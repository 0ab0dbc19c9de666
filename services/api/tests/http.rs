//! Router-level tests: authentication, status mapping and request decoding.

mod common;

use api_lib::web::build_router;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use common::*;
use mentor_core::Role;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn router() -> (Router, std::sync::Arc<api_lib::web::AppState>) {
    let (_, state) = app();
    (build_router(state.clone(), &[]), state)
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
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn signup(email: &str, role: &str) -> Value {
    json!({
        "email": email,
        "password": PASSWORD,
        "confirm_password": PASSWORD,
        "first_name": "Grace",
        "last_name": "Hopper",
        "role": role,
        "accept_terms": true
    })
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = router();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let (app, _) = router();
    let (status, body) = send(&app, Method::GET, "/api/v1/sessions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/v1/wallet", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_then_fetch_profile() {
    let (app, _) = router();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/register",
        None,
        Some(signup("grace@example.com", "solver")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["role"], "solver");

    let (status, profile) = send(&app, Method::GET, "/api/v1/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["user"]["email"], "grace@example.com");

    let (status, refreshed) =
        send(&app, Method::POST, "/api/v1/refresh-token", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(refreshed["token"].is_string());
}

#[tokio::test]
async fn mismatched_passwords_are_a_bad_request() {
    let (app, _) = router();
    let mut body = signup("typo@example.com", "seeker");
    body["confirm_password"] = json!("Different99");
    let (status, body) = send(&app, Method::POST, "/api/v1/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passwords do not match");
}

#[tokio::test]
async fn session_patch_rejects_immutable_fields() {
    let (app, state) = router();
    let solver = register(&state, "solver@example.com", Role::Solver).await;
    let seeker = register(&state, "seeker@example.com", Role::Seeker).await;
    let session = state
        .sessions
        .create_session(
            &caller(&solver.user),
            booking(seeker.user.id, Utc::now() + Duration::days(1)),
        )
        .await
        .unwrap();
    let uri = format!("/api/v1/sessions/{}", session.id);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&solver.token),
        Some(json!({ "price": "0.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&seeker.token),
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["price"], session.price.to_string());

    let outsider = register(&state, "outsider@example.com", Role::Seeker).await;
    let (status, _) = send(&app, Method::GET, &uri, Some(&outsider.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn overdraw_is_a_bad_request() {
    let (app, state) = router();
    let seeker = register(&state, "broke@example.com", Role::Seeker).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/wallet/transfer",
        Some(&seeker.token),
        Some(json!({ "amount": "5.00", "type": "withdraw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/wallet/transfer",
        Some(&seeker.token),
        Some(json!({ "amount": "5.00", "type": "deposit" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["new_balance"], "5.00");
}

#[tokio::test]
async fn oversized_deposit_is_a_bad_request() {
    let (app, state) = router();
    let seeker = register(&state, "whale@example.com", Role::Seeker).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/wallet/transfer",
        Some(&seeker.token),
        Some(json!({ "amount": "79228162514264337593543950335", "type": "deposit" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_query_is_a_json_bad_request() {
    let (app, state) = router();
    let seeker = register(&state, "query@example.com", Role::Seeker).await;
    for uri in [
        "/api/v1/sessions?status=bogus",
        "/api/v1/wallet/transactions?limit=ten",
        "/api/v1/community/events?offset=-x",
    ] {
        let (status, body) = send(&app, Method::GET, uri, Some(&seeker.token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn admin_routes_reject_non_admins() {
    let (app, state) = router();
    let seeker = register(&state, "plain@example.com", Role::Seeker).await;
    let (status, _) = send(&app, Method::GET, "/api/v1/admin/users", Some(&seeker.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/api/v1/admin/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let admin_token = tokens()
        .issue_token(Uuid::new_v4(), "root@synapmentor.test", Role::Admin)
        .unwrap();
    let (status, users) =
        send(&app, Method::GET, "/api/v1/admin/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().map(Vec::len), Some(1));

    let uri = format!("/api/v1/admin/users/{}/status", seeker.user.id);
    let (status, user) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin_token),
        Some(json!({ "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["is_active"], false);
}

#[tokio::test]
async fn leaderboard_is_public() {
    let (app, _) = router();
    let (status, body) = send(&app, Method::GET, "/api/v1/leaderboard", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());
}
