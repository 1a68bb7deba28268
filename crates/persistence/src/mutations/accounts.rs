// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session mutations.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{accounts, sessions};
use crate::error::{PersistenceError, is_unique_violation};

backend_fn! {
/// Creates a new account.
///
/// The `login_name` is trimmed and lowercased for case-insensitive
/// uniqueness. The password is hashed with bcrypt before it is stored.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `login_name` - The login name (an email address)
/// * `display_name` - The display name
/// * `password` - The plain-text password (will be hashed)
/// * `role` - `Customer` or `Admin`
/// * `now` - Creation instant
///
/// # Errors
///
/// Returns `DuplicateLoginName` if the login is taken, or an error if the
/// password cannot be hashed or the insert fails.
pub fn create_account(
    conn: &mut _,
    login_name: &str,
    display_name: &str,
    password: &str,
    role: &str,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let normalized_login: String = login_name.trim().to_lowercase();

    info!(login_name = %normalized_login, role, "Creating account");

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(accounts::table)
        .values((
            accounts::login_name.eq(&normalized_login),
            accounts::display_name.eq(display_name),
            accounts::password_hash.eq(&password_hash),
            accounts::role.eq(role),
            accounts::created_at.eq(now.unix_timestamp()),
        ))
        .execute(conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                PersistenceError::DuplicateLoginName(normalized_login.clone())
            } else {
                PersistenceError::from(e)
            }
        })?;

    let account_id: i64 = conn.get_last_insert_rowid()?;

    info!(account_id, "Account created");
    Ok(account_id)
}
}

backend_fn! {
/// Creates a new session for an account.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The unique session token
/// * `account_id` - The account ID
/// * `now` - Creation instant
/// * `expires_at` - Expiry instant
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut _,
    session_token: &str,
    account_id: i64,
    now: OffsetDateTime,
    expires_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    debug!(account_id, %expires_at, "Creating session");

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::account_id.eq(account_id),
            sessions::created_at.eq(now.unix_timestamp()),
            sessions::last_activity_at.eq(now.unix_timestamp()),
            sessions::expires_at.eq(expires_at.unix_timestamp()),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;

    debug!(session_id, account_id, "Session created");
    Ok(session_id)
}
}

backend_fn! {
/// Updates the last activity timestamp for a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut _,
    session_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(sessions::last_activity_at.eq(now.unix_timestamp()))
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Deletes a session by token.
///
/// This is used for logout operations.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(conn: &mut _, session_token: &str) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Deletes all sessions that expired before `now`.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut _,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(now.unix_timestamp()))
        .execute(conn)?;

    info!(rows_affected, "Deleted expired sessions");
    Ok(rows_affected)
}
}

backend_fn! {
/// Changes the role of an account that still has `expected_role`.
///
/// # Returns
///
/// `false` if the account does not exist or its role changed in between.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_account_role(
    conn: &mut _,
    account_id: i64,
    expected_role: &str,
    new_role: &str,
) -> Result<bool, PersistenceError> {
    let rows_affected: usize = diesel::update(accounts::table)
        .filter(accounts::account_id.eq(account_id))
        .filter(accounts::role.eq(expected_role))
        .set(accounts::role.eq(new_role))
        .execute(conn)?;

    if rows_affected > 0 {
        info!(
            account_id,
            from = expected_role,
            to = new_role,
            "Account role changed"
        );
    }
    Ok(rows_affected > 0)
}
}

backend_fn! {
/// Deletes an account together with its sessions.
///
/// Bookings keep a foreign key to their account, so an account that has
/// ever booked cannot be deleted.
///
/// # Returns
///
/// `false` if the account does not exist.
///
/// # Errors
///
/// Returns an error if the account is still referenced or the delete fails.
pub fn delete_account(conn: &mut _, account_id: i64) -> Result<bool, PersistenceError> {
    conn.transaction::<bool, PersistenceError, _>(|conn| {
        let sessions_removed: usize = diesel::delete(sessions::table)
            .filter(sessions::account_id.eq(account_id))
            .execute(conn)?;
        let rows_affected: usize = diesel::delete(accounts::table)
            .filter(accounts::account_id.eq(account_id))
            .execute(conn)?;

        if rows_affected > 0 {
            info!(account_id, sessions_removed, "Account deleted");
        }
        Ok(rows_affected > 0)
    })
}
}
