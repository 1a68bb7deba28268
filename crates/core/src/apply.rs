// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::proof::{ProofPayload, generate_proof};
use crate::state::{BookingRequest, BookingTransition, HistoryEntry};
use marquee_domain::{
    Booking, BookingStatus, DomainError, PaymentStatus, ProofOfPurchase, ReservationToken,
    cancellation_deadline, compute_total_price, validate_customer_details, validate_quantity,
};
use time::OffsetDateTime;

/// Plans a new booking from a successful reservation.
///
/// Freezes the total price, computes the cancellation deadline and
/// generates the proof-of-purchase. Nothing is persisted.
///
/// # Arguments
///
/// * `token` - The reservation granted by the inventory ledger
/// * `request` - Identifier, owner and contact details for the booking
/// * `now` - The current instant
///
/// # Returns
///
/// * `Ok(BookingTransition)` containing the new booking and its creation history row
/// * `Err(CoreError)` if the booking cannot be planned
///
/// # Errors
///
/// Returns an error if:
/// - The customer details or quantity are invalid
/// - The total price or the deadline overflows
/// - The proof-of-purchase cannot be encoded
pub fn plan_booking(
    token: &ReservationToken,
    request: BookingRequest,
    now: OffsetDateTime,
) -> Result<BookingTransition, CoreError> {
    validate_customer_details(&request.customer)?;
    validate_quantity(token.quantity)?;

    let created_at: OffsetDateTime = whole_seconds(now)?;
    let total_price: u64 = compute_total_price(token.unit_price, token.quantity)?;
    let deadline: OffsetDateTime = cancellation_deadline(token.event_date())?;

    let payload: ProofPayload = ProofPayload::new(
        &request.booking_id,
        token.event_id,
        token.tier,
        token.quantity,
        total_price,
        created_at,
    )?;
    let proof: ProofOfPurchase = generate_proof(&payload)?;

    let booking: Booking = Booking {
        booking_id: request.booking_id,
        event_id: token.event_id,
        account_id: request.account_id,
        tier: token.tier,
        quantity: token.quantity,
        unit_price: token.unit_price,
        total_price,
        customer: request.customer,
        payment_status: PaymentStatus::Pending,
        booking_status: BookingStatus::Confirmed,
        proof,
        cancellation_deadline: deadline,
        event: token.event.clone(),
        created_at,
        updated_at: created_at,
    };

    let history: HistoryEntry = HistoryEntry {
        booking_id: booking.booking_id.clone(),
        previous_status: None,
        new_status: BookingStatus::Confirmed,
        payment_status: PaymentStatus::Pending,
        actor_account_id: Some(request.account_id),
        action: String::from("Create"),
        recorded_at: created_at,
    };

    Ok(BookingTransition {
        new_booking: booking,
        history,
    })
}

/// Applies a command to a booking, producing the updated booking and a
/// history row.
///
/// Authorization is not checked here.
///
/// # Arguments
///
/// * `booking` - The current booking (immutable)
/// * `command` - The command to apply
/// * `actor_account_id` - The account performing the action
/// * `now` - The current instant
///
/// # Errors
///
/// Returns an error if:
/// - `Cancel`: the booking is not confirmed, or the deadline has passed
/// - `SettlePayment`: the payment is not pending
/// - `CheckIn`: the booking is not confirmed
pub fn apply(
    booking: &Booking,
    command: Command,
    actor_account_id: i64,
    now: OffsetDateTime,
) -> Result<BookingTransition, CoreError> {
    let mut new_booking: Booking = booking.clone();

    match command {
        Command::Cancel => {
            booking.check_cancellable(now)?;
            booking
                .booking_status
                .validate_transition(BookingStatus::Cancelled)?;
            new_booking.booking_status = BookingStatus::Cancelled;
            new_booking.payment_status = PaymentStatus::Refunded;
        }
        Command::SettlePayment { succeeded } => {
            let target: PaymentStatus = if succeeded {
                PaymentStatus::Completed
            } else {
                PaymentStatus::Failed
            };
            booking.payment_status.validate_settlement(target)?;
            new_booking.payment_status = target;
        }
        Command::CheckIn => {
            booking
                .booking_status
                .validate_transition(BookingStatus::Attended)?;
            new_booking.booking_status = BookingStatus::Attended;
        }
    }

    let recorded_at: OffsetDateTime = whole_seconds(now)?;
    new_booking.updated_at = recorded_at;

    let history: HistoryEntry = HistoryEntry {
        booking_id: booking.booking_id.clone(),
        previous_status: Some(booking.booking_status),
        new_status: new_booking.booking_status,
        payment_status: new_booking.payment_status,
        actor_account_id: Some(actor_account_id),
        action: command.action_name().to_string(),
        recorded_at,
    };

    Ok(BookingTransition {
        new_booking,
        history,
    })
}

/// Drops sub-second precision and normalises to UTC so instants survive a
/// round trip through the store unchanged.
fn whole_seconds(now: OffsetDateTime) -> Result<OffsetDateTime, CoreError> {
    OffsetDateTime::from_unix_timestamp(now.unix_timestamp()).map_err(|e| {
        CoreError::DomainViolation(DomainError::DateArithmeticOverflow {
            operation: format!("truncating {now}: {e}"),
        })
    })
}
