// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod booking;
mod error;
mod inventory;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use booking::{
    BOOKING_ID_PREFIX, Booking, BookingId, BookingStatus, CANCELLATION_WINDOW, CustomerDetails,
    PaymentStatus, ProofOfPurchase, cancellation_deadline, compute_total_price,
};
pub use error::DomainError;
pub use inventory::{ReservationToken, TierLevels};
pub use types::{
    Artist, Event, EventCategory, EventSnapshot, EventStatus, NewEvent, TicketTier, TierLabel,
    Venue,
};
pub use validation::{validate_customer_details, validate_new_event, validate_quantity};
