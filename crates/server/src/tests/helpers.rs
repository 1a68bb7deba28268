// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use marquee_persistence::Persistence;
use serde_json::{Value, json};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

use crate::AppState;
use crate::http::build_router;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "box office pass";
pub const CUSTOMER_PASSWORD: &str = "correct horse";

/// Builds a router over a fresh in-memory store with an administrator.
pub fn create_test_app() -> (Router, AppState) {
    let mut persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    marquee_api::ensure_admin_account(
        &mut persistence,
        ADMIN_EMAIL,
        ADMIN_PASSWORD,
        OffsetDateTime::now_utc(),
    )
    .expect("admin account");
    let app_state: AppState = AppState::new(persistence);
    (build_router(app_state.clone()), app_state)
}

/// Sends one request and returns the status and the decoded JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request: Request<Body> = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status: StatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(&json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["sessionToken"].as_str().unwrap().to_string()
}

pub async fn admin_token(app: &Router) -> String {
    login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// Registers a customer and returns a session token for it.
pub async fn customer_token(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(&json!({
            "email": email,
            "displayName": "Test Customer",
            "password": CUSTOMER_PASSWORD
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    login(app, email, CUSTOMER_PASSWORD).await
}

/// An RFC 3339 instant `days` from now.
pub fn days_from_now(days: i64) -> String {
    (OffsetDateTime::now_utc() + Duration::days(days))
        .replace_nanosecond(0)
        .unwrap()
        .format(&Rfc3339)
        .unwrap()
}

pub fn event_body(title: &str, regular_total: u32) -> Value {
    json!({
        "title": title,
        "description": "An evening of loud music",
        "date": days_from_now(90),
        "venue": { "name": "Riverside Arena", "address": "1 River Road", "capacity": 5000 },
        "artists": [{ "name": "The Testers", "genre": "Rock" }],
        "ticketTypes": [
            { "type": "Regular", "price": 5000, "total": regular_total },
            { "type": "VIP", "price": 15000, "total": 5, "features": ["Premium Seating"] }
        ],
        "featured": true,
        "category": "Concert",
        "duration": "3 hours"
    })
}

/// Creates an event as the administrator and returns its id.
pub async fn create_event(app: &Router, title: &str, regular_total: u32) -> i64 {
    let token: String = admin_token(app).await;
    let (status, body) = send(
        app,
        "POST",
        "/events",
        Some(&token),
        Some(&event_body(title, regular_total)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["eventId"].as_i64().unwrap()
}

pub fn booking_body(event_id: i64, tier: &str, quantity: u32) -> Value {
    json!({
        "eventId": event_id,
        "ticketType": tier,
        "quantity": quantity,
        "customerDetails": {
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "+44 20 7946 0000"
        }
    })
}

/// Regular availability as reported by `GET /events/{id}`.
pub async fn regular_available(app: &Router, event_id: i64) -> u64 {
    let (status, body) = send(app, "GET", &format!("/events/{event_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["tiers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|tier| tier["tierLabel"] == "Regular")
        .unwrap()["available"]
        .as_u64()
        .unwrap()
}
