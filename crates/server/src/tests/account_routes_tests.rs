// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

use super::helpers::{
    ADMIN_EMAIL, admin_token, booking_body, create_event, create_test_app, customer_token, send,
};

#[tokio::test]
async fn test_register_login_whoami_logout() {
    let (app, _) = create_test_app();
    let token: String = customer_token(&app, "ada@example.com").await;

    let (status, me) = send(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["loginName"], json!("ada@example.com"));
    assert_eq!(me["role"], json!("Customer"));

    let (status, body) = send(&app, "POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loggedOut"], json!(true));

    let (status, body) = send(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], json!("authentication_failed"));
}

#[tokio::test]
async fn test_admin_is_provisioned() {
    let (app, _) = create_test_app();
    let token: String = admin_token(&app).await;

    let (status, me) = send(&app, "GET", "/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["loginName"], json!(ADMIN_EMAIL));
    assert_eq!(me["role"], json!("Admin"));
}

#[tokio::test]
async fn test_register_rejections() {
    let (app, _) = create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(&json!({ "email": "ada@example.com", "name": "Ada", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], json!("invalid_input"));

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(&json!({ "email": ADMIN_EMAIL, "name": "Impostor", "password": "long enough" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], json!("invalid_input"));
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let (app, _) = create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(&json!({ "email": ADMIN_EMAIL, "password": "guessing" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], json!("authentication_failed"));
    assert_eq!(
        body["message"],
        json!("Authentication failed: Invalid email or password")
    );
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .header(header::AUTHORIZATION, "Token abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

async fn account_id(app: &axum::Router, token: &str) -> i64 {
    let (_, me) = send(app, "GET", "/auth/me", Some(token), None).await;
    me["accountId"].as_i64().unwrap()
}

#[tokio::test]
async fn test_dashboard_route() {
    let (app, _) = create_test_app();
    let event_id: i64 = create_event(&app, "Test Show", 10).await;
    let ada: String = customer_token(&app, "ada@example.com").await;
    send(
        &app,
        "POST",
        "/bookings",
        Some(&ada),
        Some(&booking_body(event_id, "Regular", 2)),
    )
    .await;

    let (status, body) = send(&app, "GET", "/users/dashboard", Some(&ada), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalBookings"], json!(1));
    assert_eq!(body["stats"]["confirmedBookings"], json!(1));
    assert_eq!(body["stats"]["upcomingEvents"], json!(1));
    assert_eq!(body["recentBookings"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/users/dashboard", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_account_admin_routes() {
    let (app, _) = create_test_app();
    let admin: String = admin_token(&app).await;
    let ada: String = customer_token(&app, "ada@example.com").await;
    let ada_id: i64 = account_id(&app, &ada).await;

    let (status, body) = send(&app, "GET", "/users?role=Customer", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["accounts"][0]["loginName"], json!("ada@example.com"));

    let (status, body) = send(&app, "GET", "/users/stats/overview", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalAccounts"], json!(2));
    assert_eq!(body["adminAccounts"], json!(1));

    let uri: String = format!("/users/{ada_id}");
    let (status, body) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["role"], json!("Customer"));
    assert_eq!(body["bookings"], json!([]));

    let role_uri: String = format!("/users/{ada_id}/role");
    let (status, body) = send(
        &app,
        "PATCH",
        &role_uri,
        Some(&admin),
        Some(&json!({ "role": "Admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], json!("Admin"));

    let (status, body) = send(&app, "DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], json!(true));

    let (status, body) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], json!("not_found"));
}

#[tokio::test]
async fn test_account_admin_routes_reject_customers() {
    let (app, _) = create_test_app();
    let ada: String = customer_token(&app, "ada@example.com").await;
    let ada_id: i64 = account_id(&app, &ada).await;

    let (status, body) = send(&app, "GET", "/users", Some(&ada), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], json!("access_denied"));

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/users/{ada_id}/role"),
        Some(&ada),
        Some(&json!({ "role": "Admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/users/not-a-number", Some(&ada), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], json!("invalid_input"));
}
