// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! Validates bearer tokens at the server boundary and hands handlers the
//! authenticated actor.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use marquee_api::{AuthenticatedActor, AuthenticationService};
use marquee_persistence::AccountData;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::AppState;
use crate::http::HttpError;

/// Extractor for authenticated accounts.
///
/// # Authentication Flow
///
/// 1. Extract `Authorization: Bearer <token>` header
/// 2. Validate the token via `AuthenticationService::validate_session`
/// 3. Return the actor, the account and the raw token
///
/// # Errors
///
/// Rejects with HTTP 401 if the header is missing or malformed, or the
/// session is unknown or expired.
pub struct SessionAccount {
    pub actor: AuthenticatedActor,
    pub account: AccountData,
    pub token: String,
}

impl FromRequestParts<AppState> for SessionAccount {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header: &str = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token: &str = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                warn!("Authorization header is not a bearer token");
                SessionError::InvalidAuthorizationHeader
            })?;

        let mut persistence = state.persistence.lock().await;
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let (actor, account) =
            AuthenticationService::validate_session(&mut persistence, token, now)
                .map_err(|e| {
                    debug!(error = %e, "Session validation failed");
                    SessionError::InvalidSession(e.to_string())
                })?;

        debug!(
            account_id = actor.account_id,
            role = actor.role.as_str(),
            "Session validated"
        );

        Ok(Self {
            actor,
            account,
            token: token.to_string(),
        })
    }
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header is not `Bearer <token>`.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => reason,
        };

        HttpError::new(StatusCode::UNAUTHORIZED, "authentication_failed", message).into_response()
    }
}
