// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use marquee_domain::Booking;
use marquee_persistence::{AccountData, Persistence, SessionData};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// Account roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Books tickets and manages their own bookings.
    Customer,
    /// Manages the event catalog and every booking.
    Admin,
}

impl Role {
    /// Returns the string stored on the account row.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Admin => "Admin",
        }
    }

    /// Parses a role name as stored on the account row.
    #[must_use]
    pub fn from_name(role: &str) -> Option<Self> {
        match role {
            "Customer" => Some(Self::Customer),
            "Admin" => Some(Self::Admin),
            _ => None,
        }
    }

    fn parse(role: &str) -> Result<Self, AuthError> {
        Self::from_name(role).ok_or_else(|| AuthError::AuthenticationFailed {
            reason: format!("Invalid role: {role}"),
        })
    }
}

/// An authenticated account with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The account identifier.
    pub account_id: i64,
    /// The normalized login name (email).
    pub login_name: String,
    /// The role assigned to this account.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(account_id: i64, login_name: String, role: Role) -> Self {
        Self {
            account_id,
            login_name,
            role,
        }
    }

    /// Builds the actor for a stored account.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored role is not recognised.
    pub fn from_account(account: &AccountData) -> Result<Self, AuthError> {
        Ok(Self::new(
            account.account_id,
            account.login_name.clone(),
            Role::parse(&account.role)?,
        ))
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor may change the event catalog.
    ///
    /// Only Admin actors may create events, change their status, adjust tier
    /// counts or set prices.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_events(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::require_admin(actor, action)
    }

    /// Checks that the actor may see every booking and the booking totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_view_all_bookings(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "list_bookings")
    }

    /// Checks that the actor may check a booking in at the venue.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_check_in(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "check_in")
    }

    /// Checks that the actor may move a booking to an arbitrary status.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_update_booking_status(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "update_booking_status")
    }

    /// Checks that the actor may list, change or delete accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_accounts(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::require_admin(actor, action)
    }

    /// Checks that the actor owns the booking or is an Admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is neither the owner nor an Admin.
    pub fn authorize_booking_access(
        actor: &AuthenticatedActor,
        booking: &Booking,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || booking.is_owned_by(actor.account_id) {
            return Ok(());
        }
        warn!(
            account_id = actor.account_id,
            booking_id = %booking.booking_id,
            action,
            "Booking access denied"
        );
        Err(AuthError::Unauthorized {
            action: action.to_string(),
            required_role: String::from("the booking owner or an Admin"),
        })
    }

    fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Customer => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("the Admin role"),
            }),
        }
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

/// A session created by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub session_token: String,
    pub actor: AuthenticatedActor,
    pub account: AccountData,
    pub expires_at: OffsetDateTime,
}

impl AuthenticationService {
    /// Session lifetime.
    pub const SESSION_DURATION: Duration = Duration::days(30);

    /// Verifies credentials and opens a session.
    ///
    /// Unknown logins and wrong passwords fail with the same message.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `login_name` - The account email
    /// * `password` - The plain-text password
    /// * `now` - The current instant
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails or the session cannot be
    /// stored.
    pub fn login(
        persistence: &mut Persistence,
        login_name: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<LoginSession, AuthError> {
        let account: AccountData = persistence
            .get_account_by_login(login_name)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Database error: {e}"),
            })?
            .ok_or_else(|| {
                debug!(login_name, "Login for unknown account");
                Self::invalid_credentials()
            })?;

        let password_ok: bool = persistence
            .verify_password(password, &account.password_hash)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Password verification failed: {e}"),
            })?;
        if !password_ok {
            warn!(account_id = account.account_id, "Login with wrong password");
            return Err(Self::invalid_credentials());
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_account(&account)?;
        let session_token: String = Self::generate_session_token(now);
        let expires_at: OffsetDateTime = now + Self::SESSION_DURATION;

        persistence
            .create_session(&session_token, account.account_id, now, expires_at)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to create session: {e}"),
            })?;

        info!(
            account_id = account.account_id,
            role = actor.role.as_str(),
            "Logged in"
        );

        Ok(LoginSession {
            session_token,
            actor,
            account,
            expires_at,
        })
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or the account
    /// no longer exists.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<(AuthenticatedActor, AccountData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Database error: {e}"),
            })?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        if now.unix_timestamp() >= session.expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let account: AccountData = persistence
            .get_account_by_id(session.account_id)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Database error: {e}"),
            })?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Account not found"),
            })?;

        let actor: AuthenticatedActor = AuthenticatedActor::from_account(&account)?;

        persistence
            .update_session_activity(session.session_id, now)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to record session activity: {e}"),
            })?;

        Ok((actor, account))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })
    }

    /// Opaque token: creation time plus 128 random bits.
    fn generate_session_token(now: OffsetDateTime) -> String {
        format!(
            "session_{}_{:016x}{:016x}",
            now.unix_timestamp(),
            rand::random::<u64>(),
            rand::random::<u64>()
        )
    }

    fn invalid_credentials() -> AuthError {
        AuthError::AuthenticationFailed {
            reason: String::from("Invalid email or password"),
        }
    }
}
