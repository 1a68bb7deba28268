// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking records and their status lifecycles.
//!
//! A booking carries two independent status machines: the booking status
//! (confirmed, cancelled, attended) and the payment status (pending,
//! completed, failed, refunded). Refunds only happen through cancellation.

use crate::error::DomainError;
use crate::types::{EventSnapshot, TierLabel};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Duration, OffsetDateTime};

/// How long before the event start a booking can still be cancelled.
pub const CANCELLATION_WINDOW: Duration = Duration::hours(24);

/// Prefix shared by every generated booking identifier.
pub const BOOKING_ID_PREFIX: &str = "BK-";

/// Longest identifier accepted from clients.
const MAX_BOOKING_ID_LEN: usize = 64;

/// Opaque, globally unique booking identifier.
///
/// Generated identifiers look like `BK-<unix-millis>-<hex>`. Client-supplied
/// identifiers (idempotent replay) must share the prefix and use only ASCII
/// alphanumerics and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookingId(String);

impl BookingId {
    /// Validates and wraps a booking identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBookingId` if the value is empty, too
    /// long, lacks the `BK-` prefix, or contains other characters.
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        if !value.starts_with(BOOKING_ID_PREFIX) || value.len() == BOOKING_ID_PREFIX.len() {
            return Err(DomainError::InvalidBookingId(format!(
                "'{value}' must start with '{BOOKING_ID_PREFIX}' followed by an identifier"
            )));
        }
        if value.len() > MAX_BOOKING_ID_LEN {
            return Err(DomainError::InvalidBookingId(format!(
                "identifier exceeds {MAX_BOOKING_ID_LEN} characters"
            )));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(DomainError::InvalidBookingId(format!(
                "'{value}' contains characters other than letters, digits and '-'"
            )));
        }
        Ok(Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BookingId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<BookingId> for String {
    fn from(value: BookingId) -> Self {
        value.0
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Tickets are held for the customer.
    Confirmed,
    /// Cancelled by the customer or an administrator.
    Cancelled,
    /// Checked in at the venue.
    Attended,
}

impl BookingStatus {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Attended => "attended",
        }
    }

    /// Returns true if no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Attended)
    }

    /// Validates a transition from this status to `new_status`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` unless the transition is
    /// `confirmed -> cancelled` or `confirmed -> attended`.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "booking is already closed".to_string(),
            });
        }
        if new_status == Self::Confirmed {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "booking is already confirmed".to_string(),
            });
        }
        Ok(())
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "attended" => Ok(Self::Attended),
            _ => Err(DomainError::InvalidBookingStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simulated payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Validates settling a pending payment as `completed` or `failed`.
    ///
    /// Refunds are not reachable through this path.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the payment is not
    /// pending or the target is not `completed`/`failed`.
    pub fn validate_settlement(&self, new_status: Self) -> Result<(), DomainError> {
        let valid = matches!(
            (self, new_status),
            (Self::Pending, Self::Completed | Self::Failed)
        );
        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "only pending payments can be settled".to_string(),
            })
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(DomainError::InvalidPaymentStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact details supplied with a booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Proof-of-purchase attached to a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfPurchase {
    /// Canonical JSON payload encoded in the QR code.
    pub payload: String,
    /// `data:` URI of the rendered QR code.
    pub image: String,
}

/// A customer's claim on tickets for one tier of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: BookingId,
    pub event_id: i64,
    /// Account that made the booking.
    pub account_id: i64,
    pub tier: TierLabel,
    pub quantity: u32,
    /// Tier price at the moment of reservation.
    pub unit_price: u64,
    /// `unit_price * quantity`, frozen at booking time.
    pub total_price: u64,
    pub customer: CustomerDetails,
    pub payment_status: PaymentStatus,
    pub booking_status: BookingStatus,
    pub proof: ProofOfPurchase,
    pub cancellation_deadline: OffsetDateTime,
    pub event: EventSnapshot,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Booking {
    /// Whether the booking can still be cancelled at `now`.
    #[must_use]
    pub fn can_cancel(&self, now: OffsetDateTime) -> bool {
        self.booking_status == BookingStatus::Confirmed && now < self.cancellation_deadline
    }

    /// Checks cancellation preconditions, status first, then deadline.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotCancellable` if the booking is not confirmed and
    /// `CancellationDeadlinePassed` if `now` is at or after the deadline.
    pub fn check_cancellable(&self, now: OffsetDateTime) -> Result<(), DomainError> {
        if self.booking_status != BookingStatus::Confirmed {
            return Err(DomainError::BookingNotCancellable {
                booking_id: self.booking_id.to_string(),
                status: self.booking_status.as_str().to_string(),
            });
        }
        if now >= self.cancellation_deadline {
            return Err(DomainError::CancellationDeadlinePassed {
                booking_id: self.booking_id.to_string(),
                deadline: self.cancellation_deadline,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn is_owned_by(&self, account_id: i64) -> bool {
        self.account_id == account_id
    }
}

/// Computes the cancellation deadline for an event starting at `event_date`.
///
/// # Errors
///
/// Returns `DateArithmeticOverflow` if the subtraction leaves the
/// representable range.
pub fn cancellation_deadline(event_date: OffsetDateTime) -> Result<OffsetDateTime, DomainError> {
    event_date
        .checked_sub(CANCELLATION_WINDOW)
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("computing cancellation deadline for {event_date}"),
        })
}

/// Computes `unit_price * quantity` with overflow detection.
///
/// # Errors
///
/// Returns `PriceOverflow` if the product does not fit in a `u64`.
pub fn compute_total_price(unit_price: u64, quantity: u32) -> Result<u64, DomainError> {
    unit_price
        .checked_mul(u64::from(quantity))
        .ok_or(DomainError::PriceOverflow {
            unit_price,
            quantity,
        })
}
