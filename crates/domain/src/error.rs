// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::TierLabel;
use time::OffsetDateTime;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A customer contact field is empty or malformed.
    InvalidCustomerDetails {
        /// The offending field (`name`, `email`, `phone`).
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// Requested ticket quantity is out of range.
    InvalidQuantity(u32),
    /// An event field failed validation.
    InvalidEvent {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A ticket tier definition is invalid.
    InvalidTier {
        /// The tier being defined.
        tier: TierLabel,
        /// Why the definition was rejected.
        reason: String,
    },
    /// The same tier label appears twice on one event.
    DuplicateTier(TierLabel),
    /// Tier label string is not one of the known labels.
    InvalidTierLabel(String),
    /// Event status string is not recognised.
    InvalidEventStatus(String),
    /// Event category string is not recognised.
    InvalidEventCategory(String),
    /// Booking status string is not recognised.
    InvalidBookingStatus(String),
    /// Payment status string is not recognised.
    InvalidPaymentStatus(String),
    /// Booking identifier is malformed.
    InvalidBookingId(String),
    /// Event does not exist.
    EventNotFound(i64),
    /// The tier is not offered by the event.
    TierNotFound {
        /// The event that was searched.
        event_id: i64,
        /// The requested tier.
        tier: TierLabel,
    },
    /// Event cannot accept bookings (wrong status or already started).
    EventNotBookable {
        /// The event.
        event_id: i64,
        /// Why the event is closed for booking.
        reason: String,
    },
    /// Not enough tickets remain in the tier.
    InsufficientInventory {
        /// The tier.
        tier: TierLabel,
        /// Tickets requested.
        requested: u32,
        /// Tickets still available.
        available: u32,
    },
    /// More tickets were returned than the tier holds offline.
    InsufficientOfflineTickets {
        /// The tier.
        tier: TierLabel,
        /// Tickets to return.
        requested: u32,
        /// Tickets currently held offline.
        offline: u32,
    },
    /// Booking does not exist.
    BookingNotFound(String),
    /// Booking is not in a state that allows cancellation.
    BookingNotCancellable {
        /// The booking.
        booking_id: String,
        /// Its current status.
        status: String,
    },
    /// The cancellation deadline has passed.
    CancellationDeadlinePassed {
        /// The booking.
        booking_id: String,
        /// The deadline that was missed.
        deadline: OffsetDateTime,
    },
    /// A status transition is not permitted.
    InvalidStatusTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// Price arithmetic overflowed.
    PriceOverflow {
        /// Unit price.
        unit_price: u64,
        /// Quantity.
        quantity: u32,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCustomerDetails { field, reason } => {
                write!(f, "Invalid customer {field}: {reason}")
            }
            Self::InvalidQuantity(quantity) => {
                write!(f, "Invalid ticket quantity {quantity}: must be at least 1")
            }
            Self::InvalidEvent { field, reason } => {
                write!(f, "Invalid event {field}: {reason}")
            }
            Self::InvalidTier { tier, reason } => {
                write!(f, "Invalid '{tier}' tier: {reason}")
            }
            Self::DuplicateTier(tier) => {
                write!(f, "Tier '{tier}' is defined more than once")
            }
            Self::InvalidTierLabel(label) => write!(
                f,
                "Invalid ticket tier '{label}'. Must be one of: Regular, VIP, Backstage Pass"
            ),
            Self::InvalidEventStatus(status) => write!(f, "Invalid event status: {status}"),
            Self::InvalidEventCategory(category) => {
                write!(f, "Invalid event category: {category}")
            }
            Self::InvalidBookingStatus(status) => write!(f, "Invalid booking status: {status}"),
            Self::InvalidPaymentStatus(status) => write!(f, "Invalid payment status: {status}"),
            Self::InvalidBookingId(msg) => write!(f, "Invalid booking id: {msg}"),
            Self::EventNotFound(event_id) => write!(f, "Event {event_id} not found"),
            Self::TierNotFound { event_id, tier } => {
                write!(f, "Ticket tier '{tier}' not found on event {event_id}")
            }
            Self::EventNotBookable { event_id, reason } => {
                write!(f, "Event {event_id} is not available for booking: {reason}")
            }
            Self::InsufficientInventory {
                tier,
                requested,
                available,
            } => write!(
                f,
                "Not enough '{tier}' tickets available: requested {requested}, available {available}"
            ),
            Self::InsufficientOfflineTickets {
                tier,
                requested,
                offline,
            } => write!(
                f,
                "Cannot return {requested} '{tier}' tickets: only {offline} are held offline"
            ),
            Self::BookingNotFound(booking_id) => write!(f, "Booking {booking_id} not found"),
            Self::BookingNotCancellable { booking_id, status } => {
                write!(
                    f,
                    "Booking {booking_id} cannot be cancelled: status is '{status}'"
                )
            }
            Self::CancellationDeadlinePassed {
                booking_id,
                deadline,
            } => write!(
                f,
                "Cancellation deadline for booking {booking_id} passed at {deadline}"
            ),
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Cannot transition from '{from}' to '{to}': {reason}")
            }
            Self::PriceOverflow {
                unit_price,
                quantity,
            } => write!(
                f,
                "Total price overflow for {quantity} tickets at {unit_price}"
            ),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
