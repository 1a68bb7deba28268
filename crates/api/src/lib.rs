// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for Marquee.
//!
//! This crate owns the booking workflow (reserve, record, compensate), the
//! event catalog operations, authentication and authorization, and the
//! request/response types the HTTP server speaks. It is transport agnostic.

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
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, LoginSession, Role};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    DASHBOARD_RECENT_BOOKINGS, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, account_dashboard, account_stats,
    adjust_tier, booking_stats, cancel_booking, cancel_event, change_account_role, check_in,
    complete_payment, create_booking, create_event, delete_account, ensure_admin_account,
    get_account, get_booking, get_booking_history, get_event, list_accounts, list_bookings,
    list_featured_events, list_my_bookings, list_upcoming_events, login, logout,
    purge_expired_sessions, register, set_tier_price, update_booking_status, update_event_status,
    verify_proof, whoami,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    AccountDetailsResponse, AccountInfo, AccountStatsResponse, AdjustTierRequest, BookedEventInfo,
    BookingHistoryInfo, BookingHistoryResponse, BookingInfo, BookingStatsResponse,
    ChangeRoleRequest, CompletePaymentRequest, CreateBookingRequest, CreateEventRequest,
    DashboardResponse, DashboardStats, DeleteAccountResponse, EventInfo, ListAccountsQuery,
    ListAccountsResponse, ListBookingsQuery, ListBookingsResponse, ListEventsResponse, LoginRequest,
    LoginResponse, MyBookingsResponse, RegisterRequest, SetTierPriceRequest, TierInfo, TierInput,
    TierLevelsResponse, UpdateBookingStatusRequest, UpdateEventStatusRequest, VerifyProofRequest,
    VerifyProofResponse,
};

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
