// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Every type serializes with camelCase keys. Instants travel as RFC 3339
//! strings and prices as integer minor currency units.

use marquee::HistoryEntry;
use marquee_domain::{Artist, Booking, CustomerDetails, Event, TicketTier, TierLevels, Venue};
use marquee_persistence::{AccountData, AccountStats, BookingStats};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::ApiError;

/// Formats an instant for a response body.
pub(crate) fn format_instant(field: &str, instant: OffsetDateTime) -> Result<String, ApiError> {
    instant
        .format(&Rfc3339)
        .map_err(|e| ApiError::EncodingFailure {
            message: format!("formatting {field}: {e}"),
        })
}

/// Parses an RFC 3339 instant from a request body.
pub(crate) fn parse_instant(field: &str, value: &str) -> Result<OffsetDateTime, ApiError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("'{value}' is not an RFC 3339 timestamp: {e}"),
    })
}

// ========================================================================
// Bookings
// ========================================================================

/// API request to book tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub event_id: i64,
    /// One of `Regular`, `VIP`, `Backstage Pass`.
    #[serde(alias = "ticketType")]
    pub tier_label: String,
    pub quantity: u32,
    pub customer_details: CustomerDetails,
    /// Client-chosen identifier; resubmitting it returns the stored booking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
}

/// API request to settle the simulated payment of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaymentRequest {
    /// Whether the payment went through.
    pub succeeded: bool,
}

/// API request to check a proof-of-purchase presented at the door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyProofRequest {
    /// The JSON payload decoded from the QR code.
    pub payload: String,
}

/// API response for a proof-of-purchase check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyProofResponse {
    pub booking_id: String,
    pub valid: bool,
    /// Current booking status, so door staff can spot cancelled tickets.
    pub booking_status: String,
}

/// Query parameters for the administrative booking listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBookingsQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub event_id: Option<i64>,
    /// 1-based page number; defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size; defaults to 10.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// API request for an administrator to move a booking to a new status.
///
/// Each status is reached through the booking command it names: `cancelled`
/// cancels (and refunds), `attended` checks in, and a payment status of
/// `completed` or `failed` settles the payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusRequest {
    #[serde(default)]
    pub booking_status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
}

/// Event details as they were when the booking was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedEventInfo {
    pub title: String,
    pub date: String,
    pub venue_name: String,
}

/// A booking as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInfo {
    pub booking_id: String,
    pub event_id: i64,
    pub account_id: i64,
    pub tier_label: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub total_price: u64,
    pub customer_details: CustomerDetails,
    pub payment_status: String,
    pub booking_status: String,
    /// `data:` URI of the QR code.
    pub qr_code: String,
    /// The canonical payload encoded in the QR code.
    pub proof_payload: String,
    pub cancellation_deadline: String,
    /// Whether the booking can still be cancelled at response time.
    pub can_cancel: bool,
    pub event: BookedEventInfo,
    pub created_at: String,
    pub updated_at: String,
}

impl BookingInfo {
    /// Builds the response view of a booking as seen at `now`.
    ///
    /// # Errors
    ///
    /// Returns `EncodingFailure` if a timestamp cannot be formatted.
    pub fn from_booking(booking: &Booking, now: OffsetDateTime) -> Result<Self, ApiError> {
        Ok(Self {
            booking_id: booking.booking_id.to_string(),
            event_id: booking.event_id,
            account_id: booking.account_id,
            tier_label: booking.tier.as_str().to_string(),
            quantity: booking.quantity,
            unit_price: booking.unit_price,
            total_price: booking.total_price,
            customer_details: booking.customer.clone(),
            payment_status: booking.payment_status.as_str().to_string(),
            booking_status: booking.booking_status.as_str().to_string(),
            qr_code: booking.proof.image.clone(),
            proof_payload: booking.proof.payload.clone(),
            cancellation_deadline: format_instant(
                "cancellationDeadline",
                booking.cancellation_deadline,
            )?,
            can_cancel: booking.can_cancel(now),
            event: BookedEventInfo {
                title: booking.event.title.clone(),
                date: format_instant("event.date", booking.event.starts_at)?,
                venue_name: booking.event.venue_name.clone(),
            },
            created_at: format_instant("createdAt", booking.created_at)?,
            updated_at: format_instant("updatedAt", booking.updated_at)?,
        })
    }
}

/// API response listing the caller's own bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyBookingsResponse {
    pub bookings: Vec<BookingInfo>,
}

/// API response for one page of the administrative booking listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBookingsResponse {
    pub bookings: Vec<BookingInfo>,
    /// Bookings matching the filter across all pages.
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub limit: u32,
}

/// API response with booking totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatsResponse {
    pub total_bookings: u64,
    pub confirmed_bookings: u64,
    pub cancelled_bookings: u64,
    pub attended_bookings: u64,
    /// Sum of completed payments, in minor units.
    pub total_revenue: u64,
}

impl From<BookingStats> for BookingStatsResponse {
    fn from(stats: BookingStats) -> Self {
        Self {
            total_bookings: stats.total_bookings,
            confirmed_bookings: stats.confirmed_bookings,
            cancelled_bookings: stats.cancelled_bookings,
            attended_bookings: stats.attended_bookings,
            total_revenue: stats.total_revenue,
        }
    }
}

/// One status change of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingHistoryInfo {
    pub action: String,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub payment_status: String,
    pub actor_account_id: Option<i64>,
    pub recorded_at: String,
}

impl BookingHistoryInfo {
    /// # Errors
    ///
    /// Returns `EncodingFailure` if the timestamp cannot be formatted.
    pub fn from_entry(entry: &HistoryEntry) -> Result<Self, ApiError> {
        Ok(Self {
            action: entry.action.clone(),
            previous_status: entry.previous_status.map(|s| s.as_str().to_string()),
            new_status: entry.new_status.as_str().to_string(),
            payment_status: entry.payment_status.as_str().to_string(),
            actor_account_id: entry.actor_account_id,
            recorded_at: format_instant("recordedAt", entry.recorded_at)?,
        })
    }
}

/// API response with the history of a booking, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingHistoryResponse {
    pub booking_id: String,
    pub entries: Vec<BookingHistoryInfo>,
}

// ========================================================================
// Events
// ========================================================================

/// A ticket tier in an event definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierInput {
    #[serde(alias = "type")]
    pub tier_label: String,
    pub price: u64,
    pub total: u32,
    /// Tickets already sold through another channel when the event is imported.
    #[serde(default)]
    pub sold: u32,
    #[serde(default)]
    pub features: Vec<String>,
}

/// API request to create an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    /// RFC 3339 start instant.
    pub date: String,
    pub venue: Venue,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(alias = "ticketTypes")]
    pub tiers: Vec<TierInput>,
    #[serde(default)]
    pub featured: bool,
    pub category: String,
    #[serde(default)]
    pub duration: String,
}

/// API request to move an event to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventStatusRequest {
    pub status: String,
}

/// API request to adjust a tier's sold count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustTierRequest {
    #[serde(alias = "ticketType")]
    pub tier_label: String,
    /// Positive takes tickets offline, negative returns them.
    pub delta: i64,
}

/// API request to change a tier's current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTierPriceRequest {
    #[serde(alias = "ticketType")]
    pub tier_label: String,
    pub price: u64,
}

/// A ticket tier as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierInfo {
    pub tier_label: String,
    pub price: u64,
    pub total: u32,
    pub sold: u32,
    pub available: u32,
    pub features: Vec<String>,
}

impl From<&TicketTier> for TierInfo {
    fn from(tier: &TicketTier) -> Self {
        Self {
            tier_label: tier.label().as_str().to_string(),
            price: tier.price(),
            total: tier.total(),
            sold: tier.sold(),
            available: tier.available(),
            features: tier.features().to_vec(),
        }
    }
}

/// Tier counters after an administrative change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierLevelsResponse {
    pub event_id: i64,
    pub tier_label: String,
    pub price: u64,
    pub total: u32,
    pub sold: u32,
    /// Part of `sold` taken offline by an administrator.
    pub offline: u32,
    pub available: u32,
}

impl TierLevelsResponse {
    #[must_use]
    pub fn new(event_id: i64, levels: &TierLevels) -> Self {
        Self {
            event_id,
            tier_label: levels.tier.as_str().to_string(),
            price: levels.price,
            total: levels.total,
            sold: levels.sold,
            offline: levels.offline,
            available: levels.available(),
        }
    }
}

/// An event as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    pub event_id: i64,
    pub title: String,
    pub description: String,
    pub date: String,
    pub venue: Venue,
    pub artists: Vec<Artist>,
    pub tiers: Vec<TierInfo>,
    pub status: String,
    pub featured: bool,
    pub category: String,
    pub duration: String,
    pub total_available_tickets: u64,
    pub total_revenue_potential: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl EventInfo {
    /// # Errors
    ///
    /// Returns `EncodingFailure` if a timestamp cannot be formatted.
    pub fn from_event(event: &Event) -> Result<Self, ApiError> {
        Ok(Self {
            event_id: event.event_id,
            title: event.title.clone(),
            description: event.description.clone(),
            date: format_instant("date", event.starts_at)?,
            venue: event.venue.clone(),
            artists: event.artists.clone(),
            tiers: event.tiers.iter().map(TierInfo::from).collect(),
            status: event.status.as_str().to_string(),
            featured: event.featured,
            category: event.category.as_str().to_string(),
            duration: event.duration.clone(),
            total_available_tickets: event.total_available_tickets(),
            total_revenue_potential: event.total_revenue_potential(),
            created_at: format_instant("createdAt", event.created_at)?,
            updated_at: format_instant("updatedAt", event.updated_at)?,
        })
    }
}

/// API response listing events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsResponse {
    pub events: Vec<EventInfo>,
}

// ========================================================================
// Accounts
// ========================================================================

/// API request to register a customer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    #[serde(alias = "name")]
    pub display_name: String,
    pub password: String,
}

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// An account as returned to clients. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub account_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub role: String,
}

impl From<&AccountData> for AccountInfo {
    fn from(account: &AccountData) -> Self {
        Self {
            account_id: account.account_id,
            login_name: account.login_name.clone(),
            display_name: account.display_name.clone(),
            role: account.role.clone(),
        }
    }
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Opaque bearer token.
    pub session_token: String,
    pub account: AccountInfo,
    pub expires_at: String,
}

/// Booking counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_bookings: usize,
    pub confirmed_bookings: usize,
    /// Distinct events with a confirmed booking that have not started yet.
    pub upcoming_events: usize,
}

/// API response for the caller's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    /// Most recent bookings, newest first.
    pub recent_bookings: Vec<BookingInfo>,
}

/// Query parameters for the administrative account listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsQuery {
    #[serde(default)]
    pub role: Option<String>,
    /// Matches the email or display name.
    #[serde(default)]
    pub search: Option<String>,
    /// 1-based page number; defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size; defaults to 10.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// API response for one page of the administrative account listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsResponse {
    pub accounts: Vec<AccountInfo>,
    /// Accounts matching the filter across all pages.
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub limit: u32,
}

/// API response with one account and its bookings, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetailsResponse {
    pub account: AccountInfo,
    pub bookings: Vec<BookingInfo>,
}

/// API request to change the role of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleRequest {
    /// `Customer` or `Admin`.
    pub role: String,
}

/// API response for a deleted account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountResponse {
    pub account_id: i64,
    pub deleted: bool,
}

/// API response with account totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatsResponse {
    pub total_accounts: u64,
    pub admin_accounts: u64,
    pub customer_accounts: u64,
    /// Accounts created during the last 30 days.
    pub new_accounts: u64,
}

impl From<AccountStats> for AccountStatsResponse {
    fn from(stats: AccountStats) -> Self {
        Self {
            total_accounts: stats.total_accounts,
            admin_accounts: stats.admin_accounts,
            customer_accounts: stats.customer_accounts,
            new_accounts: stats.new_accounts,
        }
    }
}
