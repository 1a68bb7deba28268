// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking record mutations.
//!
//! Bookings are written together with their history row. Status changes are
//! guarded on the status the caller last observed, so a concurrent change is
//! reported instead of overwritten.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use marquee::BookingTransition;
use marquee_domain::{BookingStatus, PaymentStatus};
use tracing::{debug, info};

use crate::data_models::{NewBookingRow, NewHistoryRow};
use crate::diesel_schema::{booking_history, bookings};
use crate::error::{PersistenceError, is_unique_violation};

backend_fn! {
/// Inserts a new booking and its creation history row.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `transition` - The planned booking and history entry
///
/// # Errors
///
/// Returns `DuplicateBookingId` if the identifier is taken, or a database
/// error (including foreign key failures for an unknown event or account).
pub fn insert_booking(
    conn: &mut _,
    transition: &BookingTransition,
) -> Result<(), PersistenceError> {
    let row: NewBookingRow = NewBookingRow::from_booking(&transition.new_booking)?;
    let history: NewHistoryRow = NewHistoryRow::from(&transition.history);

    conn.transaction::<(), PersistenceError, _>(|conn| {
        diesel::insert_into(bookings::table)
            .values(&row)
            .execute(conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PersistenceError::DuplicateBookingId(row.booking_id.clone())
                } else {
                    PersistenceError::from(e)
                }
            })?;

        diesel::insert_into(booking_history::table)
            .values(&history)
            .execute(conn)?;

        info!(
            booking_id = %row.booking_id,
            event_id = row.event_id,
            account_id = row.account_id,
            quantity = row.quantity,
            "Booking stored"
        );
        Ok(())
    })
}
}

backend_fn! {
/// Applies a planned status change to a stored booking.
///
/// The update matches only while the booking still has `expected_status`
/// and `expected_payment`. The history row is written in the same
/// transaction.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `transition` - The booking after the change and its history entry
/// * `expected_status` - Booking status the caller observed
/// * `expected_payment` - Payment status the caller observed
///
/// # Errors
///
/// Returns `BookingStateConflict` if the booking is no longer in the
/// expected state (or does not exist), or a database error.
pub fn transition_booking(
    conn: &mut _,
    transition: &BookingTransition,
    expected_status: BookingStatus,
    expected_payment: PaymentStatus,
) -> Result<(), PersistenceError> {
    let booking = &transition.new_booking;
    let history: NewHistoryRow = NewHistoryRow::from(&transition.history);

    conn.transaction::<(), PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(bookings::table)
            .filter(bookings::booking_id.eq(booking.booking_id.as_str()))
            .filter(bookings::booking_status.eq(expected_status.as_str()))
            .filter(bookings::payment_status.eq(expected_payment.as_str()))
            .set((
                bookings::booking_status.eq(booking.booking_status.as_str()),
                bookings::payment_status.eq(booking.payment_status.as_str()),
                bookings::updated_at.eq(booking.updated_at.unix_timestamp()),
            ))
            .execute(conn)?;

        if updated == 0 {
            debug!(
                booking_id = %booking.booking_id,
                expected_status = %expected_status,
                expected_payment = %expected_payment,
                "Guarded booking update matched no row"
            );
            return Err(PersistenceError::BookingStateConflict {
                booking_id: booking.booking_id.to_string(),
                expected: format!("{expected_status}/{expected_payment}"),
            });
        }

        diesel::insert_into(booking_history::table)
            .values(&history)
            .execute(conn)?;

        info!(
            booking_id = %booking.booking_id,
            action = %transition.history.action,
            status = %booking.booking_status,
            payment = %booking.payment_status,
            "Booking updated"
        );
        Ok(())
    })
}
}
