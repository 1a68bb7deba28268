// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{NOW, create_test_persistence};
use crate::{
    ApiError, AuthError, AuthenticationService, LoginRequest, RegisterRequest, Role,
    ensure_admin_account, login, logout, purge_expired_sessions, register,
};
use marquee_persistence::Persistence;
use time::Duration;

fn register_request(email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        display_name: String::from("Ada Lovelace"),
        password: password.to_string(),
    }
}

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn register_ada(persistence: &mut Persistence) {
    register(
        persistence,
        &register_request("ada@example.com", "analytical engine"),
        NOW,
    )
    .unwrap();
}

#[test]
fn test_register_creates_customer() {
    let mut persistence = create_test_persistence();

    let account = register(
        &mut persistence,
        &register_request("ada@example.com", "analytical engine"),
        NOW,
    )
    .unwrap();

    assert_eq!(account.login_name, "ada@example.com");
    assert_eq!(account.display_name, "Ada Lovelace");
    assert_eq!(account.role, Role::Customer.as_str());
}

#[test]
fn test_register_duplicate_email_is_rejected() {
    let mut persistence = create_test_persistence();
    register_ada(&mut persistence);

    let err = register(
        &mut persistence,
        &register_request("ada@example.com", "difference engine"),
        NOW,
    )
    .unwrap_err();

    assert_eq!(err.kind(), "invalid_input");
}

#[test]
fn test_register_enforces_password_policy() {
    let mut persistence = create_test_persistence();

    let short = register(
        &mut persistence,
        &register_request("ada@example.com", "short"),
        NOW,
    )
    .unwrap_err();
    assert_eq!(
        short,
        ApiError::PasswordPolicyViolation {
            message: String::from("Password must be at least 8 characters long"),
        }
    );

    let same = register(
        &mut persistence,
        &register_request("ada@example.com", "ADA@example.com"),
        NOW,
    )
    .unwrap_err();
    assert_eq!(same.kind(), "invalid_input");
}

#[test]
fn test_register_rejects_malformed_email_and_blank_name() {
    let mut persistence = create_test_persistence();

    let email = register(
        &mut persistence,
        &register_request("ada.example.com", "analytical engine"),
        NOW,
    )
    .unwrap_err();
    assert_eq!(email.kind(), "invalid_input");

    let mut blank = register_request("ada@example.com", "analytical engine");
    blank.display_name = String::from("   ");
    let name = register(&mut persistence, &blank, NOW).unwrap_err();
    assert_eq!(name.kind(), "invalid_input");
}

#[test]
fn test_login_and_validate_session() {
    let mut persistence = create_test_persistence();
    register_ada(&mut persistence);

    let response = login(
        &mut persistence,
        &login_request("ada@example.com", "analytical engine"),
        NOW,
    )
    .unwrap();
    assert!(response.session_token.starts_with("session_"));
    assert_eq!(response.expires_at, "2026-07-01T12:00:00Z");

    let (actor, account) = AuthenticationService::validate_session(
        &mut persistence,
        &response.session_token,
        NOW + Duration::days(1),
    )
    .unwrap();
    assert_eq!(actor.login_name, "ada@example.com");
    assert_eq!(actor.role, Role::Customer);
    assert_eq!(account.account_id, response.account.account_id);
}

#[test]
fn test_login_failures_share_one_message() {
    let mut persistence = create_test_persistence();
    register_ada(&mut persistence);

    let wrong_password = login(
        &mut persistence,
        &login_request("ada@example.com", "babbage"),
        NOW,
    )
    .unwrap_err();
    let unknown = login(
        &mut persistence,
        &login_request("bob@example.com", "analytical engine"),
        NOW,
    )
    .unwrap_err();

    assert_eq!(wrong_password, unknown);
    assert_eq!(wrong_password.kind(), "authentication_failed");
}

#[test]
fn test_logout_invalidates_session() {
    let mut persistence = create_test_persistence();
    register_ada(&mut persistence);
    let response = login(
        &mut persistence,
        &login_request("ada@example.com", "analytical engine"),
        NOW,
    )
    .unwrap();

    logout(&mut persistence, &response.session_token).unwrap();

    let err =
        AuthenticationService::validate_session(&mut persistence, &response.session_token, NOW)
            .unwrap_err();
    assert_eq!(
        err,
        AuthError::AuthenticationFailed {
            reason: String::from("Invalid session token"),
        }
    );
}

#[test]
fn test_expired_session_is_rejected_and_purged() {
    let mut persistence = create_test_persistence();
    register_ada(&mut persistence);
    let response = login(
        &mut persistence,
        &login_request("ada@example.com", "analytical engine"),
        NOW,
    )
    .unwrap();
    let expiry = NOW + AuthenticationService::SESSION_DURATION;

    let err =
        AuthenticationService::validate_session(&mut persistence, &response.session_token, expiry)
            .unwrap_err();
    assert_eq!(
        err,
        AuthError::AuthenticationFailed {
            reason: String::from("Session expired"),
        }
    );

    assert_eq!(purge_expired_sessions(&mut persistence, expiry).unwrap(), 0);
    assert_eq!(
        purge_expired_sessions(&mut persistence, expiry + Duration::seconds(1)).unwrap(),
        1
    );
}

#[test]
fn test_ensure_admin_account_is_idempotent() {
    let mut persistence = create_test_persistence();

    assert!(ensure_admin_account(&mut persistence, "root@example.com", "box office", NOW).unwrap());
    assert!(
        !ensure_admin_account(&mut persistence, "root@example.com", "other pass", NOW).unwrap()
    );

    let response = login(
        &mut persistence,
        &login_request("root@example.com", "box office"),
        NOW,
    )
    .unwrap();
    assert_eq!(response.account.role, Role::Admin.as_str());
    assert_eq!(response.account.display_name, "Administrator");
}

#[test]
fn test_ensure_admin_account_validates_password() {
    let mut persistence = create_test_persistence();

    let err = ensure_admin_account(&mut persistence, "root@example.com", "short", NOW).unwrap_err();

    assert_eq!(err.kind(), "invalid_input");
}
