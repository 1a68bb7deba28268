// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and the conversions between stored rows and domain values.
//!
//! Instants are stored as unix seconds (`BIGINT`) and prices as minor units.
//! Conversions are checked in both directions.

use diesel::prelude::*;
use marquee::HistoryEntry;
use marquee_domain::{
    Artist, Booking, BookingId, BookingStatus, CustomerDetails, Event, EventSnapshot, EventStatus,
    PaymentStatus, ProofOfPurchase, TicketTier, TierLabel, Venue,
};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

use crate::diesel_schema::{booking_history, bookings, events, ticket_tiers};
use crate::error::PersistenceError;

/// Stored account, including the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountData {
    pub account_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: i64,
}

/// Stored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub account_id: i64,
    pub created_at: i64,
    pub last_activity_at: i64,
    pub expires_at: i64,
}

/// Optional filters for the administrative account listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub role: Option<String>,
    /// Substring of the login or display name.
    pub search: Option<String>,
}

/// One page of accounts plus the size of the full result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPage {
    pub accounts: Vec<AccountData>,
    /// Number of accounts matching the filter across all pages.
    pub total: u64,
}

/// Account counts per role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStats {
    pub total_accounts: u64,
    pub admin_accounts: u64,
    pub customer_accounts: u64,
    /// Accounts created at or after the requested cutoff.
    pub new_accounts: u64,
}

/// Optional filters for the administrative booking listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub event_id: Option<i64>,
}

/// One page of bookings plus the size of the full result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingPage {
    pub bookings: Vec<Booking>,
    /// Number of bookings matching the filter across all pages.
    pub total: u64,
}

/// Aggregate booking figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingStats {
    pub total_bookings: u64,
    pub confirmed_bookings: u64,
    pub cancelled_bookings: u64,
    pub attended_bookings: u64,
    /// Sum of `total_price` over bookings with a completed payment.
    pub total_revenue: u64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
pub struct EventRow {
    pub event_id: i64,
    pub title: String,
    pub description: String,
    pub starts_at: i64,
    pub venue_name: String,
    pub venue_address: String,
    pub venue_capacity: i32,
    pub status: String,
    pub featured: i32,
    pub category: String,
    pub duration: String,
    pub artists_json: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ticket_tiers)]
pub struct TierRow {
    pub event_id: i64,
    pub tier_label: String,
    pub position: i32,
    pub price: i64,
    pub total: i32,
    pub sold: i32,
    pub features_json: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
pub struct BookingRow {
    pub booking_id: String,
    pub event_id: i64,
    pub account_id: i64,
    pub tier_label: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub payment_status: String,
    pub booking_status: String,
    pub proof_payload: String,
    pub proof_image: String,
    pub cancellation_deadline: i64,
    pub event_title: String,
    pub event_starts_at: i64,
    pub venue_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = booking_history)]
pub struct HistoryRow {
    pub booking_id: String,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub payment_status: String,
    pub actor_account_id: Option<i64>,
    pub action: String,
    pub recorded_at: i64,
}

/// Insertable form of a booking.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBookingRow {
    pub booking_id: String,
    pub event_id: i64,
    pub account_id: i64,
    pub tier_label: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub payment_status: String,
    pub booking_status: String,
    pub proof_payload: String,
    pub proof_image: String,
    pub cancellation_deadline: i64,
    pub event_title: String,
    pub event_starts_at: i64,
    pub venue_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Insertable form of a history entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = booking_history)]
pub struct NewHistoryRow {
    pub booking_id: String,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub payment_status: String,
    pub actor_account_id: Option<i64>,
    pub action: String,
    pub recorded_at: i64,
}

pub fn to_instant(seconds: i64, column: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|e| PersistenceError::InvalidRow(format!("{column}={seconds}: {e}")))
}

pub fn to_u32(value: i32, column: &str) -> Result<u32, PersistenceError> {
    value
        .to_u32()
        .ok_or_else(|| PersistenceError::InvalidRow(format!("{column}={value} is negative")))
}

pub fn to_u64(value: i64, column: &str) -> Result<u64, PersistenceError> {
    value
        .to_u64()
        .ok_or_else(|| PersistenceError::InvalidRow(format!("{column}={value} is negative")))
}

pub fn to_column_i32(value: u32, column: &str) -> Result<i32, PersistenceError> {
    value
        .to_i32()
        .ok_or_else(|| PersistenceError::OutOfRange(format!("{column}={value}")))
}

pub fn to_column_i64(value: u64, column: &str) -> Result<i64, PersistenceError> {
    value
        .to_i64()
        .ok_or_else(|| PersistenceError::OutOfRange(format!("{column}={value}")))
}

fn parse_column<T>(value: &str) -> Result<T, PersistenceError>
where
    T: FromStr<Err = marquee_domain::DomainError>,
{
    T::from_str(value).map_err(|e| PersistenceError::InvalidRow(e.to_string()))
}

impl TierRow {
    /// Converts a tier row into a domain tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the row violates tier invariants.
    pub fn into_tier(self) -> Result<TicketTier, PersistenceError> {
        let features: Vec<String> = serde_json::from_str(&self.features_json)?;
        let tier: TicketTier = TicketTier::with_sold(
            parse_column::<TierLabel>(&self.tier_label)?,
            to_u64(self.price, "price")?,
            to_u32(self.total, "total")?,
            to_u32(self.sold, "sold")?,
        )
        .map_err(|e| PersistenceError::InvalidRow(e.to_string()))?;
        Ok(tier.with_features(features))
    }
}

impl EventRow {
    /// Converts an event row and its tier rows into a domain event.
    ///
    /// Tier rows must belong to this event and be in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if any column cannot be converted.
    pub fn into_event(self, tiers: Vec<TierRow>) -> Result<Event, PersistenceError> {
        let artists: Vec<Artist> = serde_json::from_str(&self.artists_json)?;
        let tiers: Vec<TicketTier> = tiers
            .into_iter()
            .map(TierRow::into_tier)
            .collect::<Result<_, _>>()?;
        Ok(Event {
            event_id: self.event_id,
            title: self.title,
            description: self.description,
            starts_at: to_instant(self.starts_at, "starts_at")?,
            venue: Venue {
                name: self.venue_name,
                address: self.venue_address,
                capacity: to_u32(self.venue_capacity, "venue_capacity")?,
            },
            artists,
            tiers,
            status: parse_column::<EventStatus>(&self.status)?,
            featured: self.featured != 0,
            category: parse_column(&self.category)?,
            duration: self.duration,
            created_at: to_instant(self.created_at, "created_at")?,
            updated_at: to_instant(self.updated_at, "updated_at")?,
        })
    }
}

/// Groups tier rows by event and assembles events, preserving event order.
///
/// # Errors
///
/// Returns an error if any row cannot be converted.
pub fn assemble_events(
    rows: Vec<EventRow>,
    mut tiers: Vec<TierRow>,
) -> Result<Vec<Event>, PersistenceError> {
    tiers.sort_by_key(|t| (t.event_id, t.position));
    rows.into_iter()
        .map(|row| {
            let own: Vec<TierRow> = tiers
                .iter()
                .filter(|t| t.event_id == row.event_id)
                .cloned()
                .collect();
            row.into_event(own)
        })
        .collect()
}

impl BookingRow {
    /// Converts a booking row into a domain booking.
    ///
    /// # Errors
    ///
    /// Returns an error if any column cannot be converted.
    pub fn into_booking(self) -> Result<Booking, PersistenceError> {
        Ok(Booking {
            booking_id: BookingId::new(&self.booking_id)
                .map_err(|e| PersistenceError::InvalidRow(e.to_string()))?,
            event_id: self.event_id,
            account_id: self.account_id,
            tier: parse_column(&self.tier_label)?,
            quantity: to_u32(self.quantity, "quantity")?,
            unit_price: to_u64(self.unit_price, "unit_price")?,
            total_price: to_u64(self.total_price, "total_price")?,
            customer: CustomerDetails {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
            },
            payment_status: parse_column::<PaymentStatus>(&self.payment_status)?,
            booking_status: parse_column::<BookingStatus>(&self.booking_status)?,
            proof: ProofOfPurchase {
                payload: self.proof_payload,
                image: self.proof_image,
            },
            cancellation_deadline: to_instant(self.cancellation_deadline, "cancellation_deadline")?,
            event: EventSnapshot {
                title: self.event_title,
                starts_at: to_instant(self.event_starts_at, "event_starts_at")?,
                venue_name: self.venue_name,
            },
            created_at: to_instant(self.created_at, "created_at")?,
            updated_at: to_instant(self.updated_at, "updated_at")?,
        })
    }
}

impl NewBookingRow {
    /// Builds the insertable row for a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric field does not fit its column.
    pub fn from_booking(booking: &Booking) -> Result<Self, PersistenceError> {
        Ok(Self {
            booking_id: booking.booking_id.to_string(),
            event_id: booking.event_id,
            account_id: booking.account_id,
            tier_label: booking.tier.as_str().to_string(),
            quantity: to_column_i32(booking.quantity, "quantity")?,
            unit_price: to_column_i64(booking.unit_price, "unit_price")?,
            total_price: to_column_i64(booking.total_price, "total_price")?,
            customer_name: booking.customer.name.clone(),
            customer_email: booking.customer.email.clone(),
            customer_phone: booking.customer.phone.clone(),
            payment_status: booking.payment_status.as_str().to_string(),
            booking_status: booking.booking_status.as_str().to_string(),
            proof_payload: booking.proof.payload.clone(),
            proof_image: booking.proof.image.clone(),
            cancellation_deadline: booking.cancellation_deadline.unix_timestamp(),
            event_title: booking.event.title.clone(),
            event_starts_at: booking.event.starts_at.unix_timestamp(),
            venue_name: booking.event.venue_name.clone(),
            created_at: booking.created_at.unix_timestamp(),
            updated_at: booking.updated_at.unix_timestamp(),
        })
    }
}

impl From<&HistoryEntry> for NewHistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            booking_id: entry.booking_id.to_string(),
            previous_status: entry.previous_status.map(|s| s.as_str().to_string()),
            new_status: entry.new_status.as_str().to_string(),
            payment_status: entry.payment_status.as_str().to_string(),
            actor_account_id: entry.actor_account_id,
            action: entry.action.clone(),
            recorded_at: entry.recorded_at.unix_timestamp(),
        }
    }
}

impl HistoryRow {
    /// Converts a history row into a history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if any column cannot be converted.
    pub fn into_entry(self) -> Result<HistoryEntry, PersistenceError> {
        Ok(HistoryEntry {
            booking_id: BookingId::new(&self.booking_id)
                .map_err(|e| PersistenceError::InvalidRow(e.to_string()))?,
            previous_status: self
                .previous_status
                .as_deref()
                .map(parse_column::<BookingStatus>)
                .transpose()?,
            new_status: parse_column(&self.new_status)?,
            payment_status: parse_column(&self.payment_status)?,
            actor_account_id: self.actor_account_id,
            action: self.action,
            recorded_at: to_instant(self.recorded_at, "recorded_at")?,
        })
    }
}
