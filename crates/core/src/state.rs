// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use marquee_domain::{Booking, BookingId, BookingStatus, CustomerDetails, PaymentStatus};
use time::OffsetDateTime;

/// A row of booking history describing one status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub booking_id: BookingId,
    /// `None` when the booking was just created.
    pub previous_status: Option<BookingStatus>,
    pub new_status: BookingStatus,
    /// Payment status after the change.
    pub payment_status: PaymentStatus,
    /// Account that caused the change, if any.
    pub actor_account_id: Option<i64>,
    /// Short action name, e.g. `Create` or `Cancel`.
    pub action: String,
    pub recorded_at: OffsetDateTime,
}

/// The result of a successful booking transition.
///
/// Transitions are pure: they either succeed completely or fail without
/// side effects. Persisting the result is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingTransition {
    /// The booking after the transition.
    pub new_booking: Booking,
    /// The history row recording this transition.
    pub history: HistoryEntry,
}

/// Inputs to planning a new booking, apart from the reservation itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub booking_id: BookingId,
    pub account_id: i64,
    pub customer: CustomerDetails,
}
