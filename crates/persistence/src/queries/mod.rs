// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `events`: Event catalog queries (events with their tiers)
//! - `bookings`: Booking, history and statistics queries
//! - `accounts`: Account and session queries
//!
//! ## Backend-Specific Functions
//!
//! All query functions are generated in backend-specific monomorphic versions:
//! - Functions suffixed with `_sqlite` for `SQLite`
//! - Functions suffixed with `_mysql` for `MySQL`/`MariaDB`
//!
//! The `Persistence` adapter in `lib.rs` dispatches to the appropriate version
//! based on the active backend connection.

pub mod accounts;
pub mod bookings;
pub mod events;

pub use accounts::{
    account_stats_mysql, account_stats_sqlite, get_account_by_id_mysql, get_account_by_id_sqlite,
    get_account_by_login_mysql, get_account_by_login_sqlite, get_session_by_token_mysql,
    get_session_by_token_sqlite, list_accounts_mysql, list_accounts_sqlite, verify_password,
};
pub use bookings::{
    booking_stats_mysql, booking_stats_sqlite, get_booking_history_mysql,
    get_booking_history_sqlite, get_booking_mysql, get_booking_sqlite,
    list_bookings_for_account_mysql, list_bookings_for_account_sqlite, list_bookings_mysql,
    list_bookings_sqlite,
};
pub use events::{get_event_mysql, get_event_sqlite, list_events_mysql, list_events_sqlite};
