// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking record queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use marquee::HistoryEntry;
use marquee_domain::{Booking, BookingStatus, PaymentStatus};
use tracing::debug;

use crate::data_models::{BookingFilter, BookingPage, BookingRow, BookingStats, HistoryRow, to_u64};
use crate::diesel_schema::{booking_history, bookings};
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves a booking by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is invalid.
/// Returns `Ok(None)` if the booking does not exist.
pub fn get_booking(conn: &mut _, booking_id: &str) -> Result<Option<Booking>, PersistenceError> {
    let row: Option<BookingRow> = bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(BookingRow::as_select())
        .first(conn)
        .optional()?;

    row.map(BookingRow::into_booking).transpose()
}
}

backend_fn! {
/// Lists the bookings of one account, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is invalid.
pub fn list_bookings_for_account(
    conn: &mut _,
    account_id: i64,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::account_id.eq(account_id))
        .order((bookings::created_at.desc(), bookings::booking_id.desc()))
        .select(BookingRow::as_select())
        .load(conn)?;

    debug!(
        account_id,
        count = rows.len(),
        "Listed bookings for account"
    );
    rows.into_iter().map(BookingRow::into_booking).collect()
}
}

backend_fn! {
/// Lists one page of bookings matching `filter`, newest first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `filter` - Optional status and event filters
/// * `offset` - Number of matching bookings to skip
/// * `limit` - Maximum number of bookings to return
///
/// # Returns
///
/// The page and the number of bookings matching the filter overall.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is invalid.
pub fn list_bookings(
    conn: &mut _,
    filter: BookingFilter,
    offset: i64,
    limit: i64,
) -> Result<BookingPage, PersistenceError> {
    let mut count_query = bookings::table.into_boxed();
    let mut page_query = bookings::table.into_boxed();

    if let Some(status) = filter.status {
        count_query = count_query.filter(bookings::booking_status.eq(status.as_str()));
        page_query = page_query.filter(bookings::booking_status.eq(status.as_str()));
    }
    if let Some(event_id) = filter.event_id {
        count_query = count_query.filter(bookings::event_id.eq(event_id));
        page_query = page_query.filter(bookings::event_id.eq(event_id));
    }

    let total: i64 = count_query.count().get_result(conn)?;
    let rows: Vec<BookingRow> = page_query
        .order((bookings::created_at.desc(), bookings::booking_id.desc()))
        .offset(offset)
        .limit(limit)
        .select(BookingRow::as_select())
        .load(conn)?;

    Ok(BookingPage {
        bookings: rows
            .into_iter()
            .map(BookingRow::into_booking)
            .collect::<Result<_, _>>()?,
        total: to_u64(total, "count")?,
    })
}
}

backend_fn! {
/// Retrieves the history of a booking, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is invalid.
pub fn get_booking_history(
    conn: &mut _,
    booking_id: &str,
) -> Result<Vec<HistoryEntry>, PersistenceError> {
    let rows: Vec<HistoryRow> = booking_history::table
        .filter(booking_history::booking_id.eq(booking_id))
        .order(booking_history::history_id.asc())
        .select(HistoryRow::as_select())
        .load(conn)?;

    rows.into_iter().map(HistoryRow::into_entry).collect()
}
}

backend_fn! {
/// Computes booking counts per status and revenue from completed payments.
///
/// # Errors
///
/// Returns an error if the database query fails or revenue overflows.
pub fn booking_stats(conn: &mut _) -> Result<BookingStats, PersistenceError> {
    let total: i64 = bookings::table.count().get_result(conn)?;
    let confirmed: i64 = bookings::table
        .filter(bookings::booking_status.eq(BookingStatus::Confirmed.as_str()))
        .count()
        .get_result(conn)?;
    let cancelled: i64 = bookings::table
        .filter(bookings::booking_status.eq(BookingStatus::Cancelled.as_str()))
        .count()
        .get_result(conn)?;
    let attended: i64 = bookings::table
        .filter(bookings::booking_status.eq(BookingStatus::Attended.as_str()))
        .count()
        .get_result(conn)?;

    let paid: Vec<i64> = bookings::table
        .filter(bookings::payment_status.eq(PaymentStatus::Completed.as_str()))
        .select(bookings::total_price)
        .load(conn)?;
    let total_revenue: u64 = paid.into_iter().try_fold(0_u64, |sum, price| {
        sum.checked_add(to_u64(price, "total_price")?)
            .ok_or_else(|| PersistenceError::OutOfRange(String::from("total revenue")))
    })?;

    Ok(BookingStats {
        total_bookings: to_u64(total, "count")?,
        confirmed_bookings: to_u64(confirmed, "count")?,
        cancelled_bookings: to_u64(cancelled, "count")?,
        attended_bookings: to_u64(attended, "count")?,
        total_revenue,
    })
}
}
