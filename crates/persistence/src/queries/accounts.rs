// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use time::OffsetDateTime;
use tracing::debug;

use crate::data_models::{
    AccountData, AccountFilter, AccountPage, AccountStats, SessionData, to_u64,
};
use crate::diesel_schema::{accounts, sessions};
use crate::error::PersistenceError;

/// Diesel Queryable struct for account rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = accounts)]
struct AccountRow {
    account_id: i64,
    login_name: String,
    display_name: String,
    password_hash: String,
    role: String,
    created_at: i64,
}

impl From<AccountRow> for AccountData {
    fn from(row: AccountRow) -> Self {
        Self {
            account_id: row.account_id,
            login_name: row.login_name,
            display_name: row.display_name,
            password_hash: row.password_hash,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

/// Diesel Queryable struct for session rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
struct SessionRow {
    session_id: i64,
    session_token: String,
    account_id: i64,
    created_at: i64,
    last_activity_at: i64,
    expires_at: i64,
}

backend_fn! {
/// Retrieves an account by login name.
///
/// The `login_name` is normalized to lowercase for case-insensitive lookup.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the account is not found.
pub fn get_account_by_login(
    conn: &mut _,
    login_name: &str,
) -> Result<Option<AccountData>, PersistenceError> {
    let normalized_login: String = login_name.trim().to_lowercase();

    debug!(login_name = %normalized_login, "Looking up account by login");

    let row: Option<AccountRow> = accounts::table
        .filter(accounts::login_name.eq(&normalized_login))
        .select(AccountRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(AccountData::from))
}
}

backend_fn! {
/// Retrieves an account by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the account is not found.
pub fn get_account_by_id(
    conn: &mut _,
    account_id: i64,
) -> Result<Option<AccountData>, PersistenceError> {
    let row: Option<AccountRow> = accounts::table
        .filter(accounts::account_id.eq(account_id))
        .select(AccountRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(AccountData::from))
}
}

/// Builds a `LIKE` pattern matching `search` anywhere, with wildcards escaped.
fn contains_pattern(search: &str) -> String {
    let mut pattern: String = String::from("%");
    for c in search.trim().to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

backend_fn! {
/// Lists one page of accounts matching `filter`, newest first.
///
/// The search matches the login name or the display name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_accounts(
    conn: &mut _,
    filter: &AccountFilter,
    offset: i64,
    limit: i64,
) -> Result<AccountPage, PersistenceError> {
    let mut count_query = accounts::table.into_boxed();
    let mut page_query = accounts::table.into_boxed();

    if let Some(role) = &filter.role {
        count_query = count_query.filter(accounts::role.eq(role.clone()));
        page_query = page_query.filter(accounts::role.eq(role.clone()));
    }
    if let Some(search) = &filter.search {
        let pattern: String = contains_pattern(search);
        count_query = count_query.filter(
            accounts::login_name
                .like(pattern.clone())
                .escape('\\')
                .or(accounts::display_name.like(pattern.clone()).escape('\\')),
        );
        page_query = page_query.filter(
            accounts::login_name
                .like(pattern.clone())
                .escape('\\')
                .or(accounts::display_name.like(pattern).escape('\\')),
        );
    }

    let total: i64 = count_query.count().get_result(conn)?;
    let rows: Vec<AccountRow> = page_query
        .order((accounts::created_at.desc(), accounts::account_id.desc()))
        .offset(offset)
        .limit(limit)
        .select(AccountRow::as_select())
        .load(conn)?;

    debug!(total, returned = rows.len(), "Listed accounts");
    Ok(AccountPage {
        accounts: rows.into_iter().map(AccountData::from).collect(),
        total: to_u64(total, "count")?,
    })
}
}

backend_fn! {
/// Counts accounts per role and those created since `since`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn account_stats(
    conn: &mut _,
    admin_role: &str,
    customer_role: &str,
    since: OffsetDateTime,
) -> Result<AccountStats, PersistenceError> {
    let total: i64 = accounts::table.count().get_result(conn)?;
    let admins: i64 = accounts::table
        .filter(accounts::role.eq(admin_role))
        .count()
        .get_result(conn)?;
    let customers: i64 = accounts::table
        .filter(accounts::role.eq(customer_role))
        .count()
        .get_result(conn)?;
    let recent: i64 = accounts::table
        .filter(accounts::created_at.ge(since.unix_timestamp()))
        .count()
        .get_result(conn)?;

    Ok(AccountStats {
        total_accounts: to_u64(total, "count")?,
        admin_accounts: to_u64(admins, "count")?,
        customer_accounts: to_u64(customers, "count")?,
        new_accounts: to_u64(recent, "count")?,
    })
}
}

backend_fn! {
/// Retrieves a session by token.
///
/// Expiry is not checked here; callers compare `expires_at` themselves.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the session is not found.
pub fn get_session_by_token(
    conn: &mut _,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    let row: Option<SessionRow> = sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(|row| SessionData {
        session_id: row.session_id,
        session_token: row.session_token,
        account_id: row.account_id,
        created_at: row.created_at,
        last_activity_at: row.last_activity_at,
        expires_at: row.expires_at,
    }))
}
}

/// Verifies a password against a bcrypt hash.
///
/// # Errors
///
/// Returns an error if the hash is malformed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}
