// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic mutation modules.
//!
//! ## Module Organization
//!
//! - `ledger`: Guarded updates of tier counters (the only writer of `sold` and `offline`)
//! - `events`: Event catalog inserts and status changes
//! - `bookings`: Booking inserts and guarded status changes
//! - `accounts`: Account and session mutations
//!
//! Backend-specific helpers (e.g., `get_last_insert_rowid()`) are imported from
//! the `backend` module. All other code uses Diesel DSL exclusively.

pub mod accounts;
pub mod bookings;
pub mod events;
pub mod ledger;

pub use accounts::{
    create_account_mysql, create_account_sqlite, create_session_mysql, create_session_sqlite,
    delete_account_mysql, delete_account_sqlite, delete_expired_sessions_mysql,
    delete_expired_sessions_sqlite, delete_session_mysql, delete_session_sqlite,
    update_account_role_mysql, update_account_role_sqlite, update_session_activity_mysql,
    update_session_activity_sqlite,
};
pub use bookings::{
    insert_booking_mysql, insert_booking_sqlite, transition_booking_mysql,
    transition_booking_sqlite,
};
pub use events::{
    create_event_mysql, create_event_sqlite, update_event_status_mysql, update_event_status_sqlite,
};
pub use ledger::{
    release_mysql, release_sqlite, reserve_mysql, reserve_sqlite, return_offline_mysql,
    return_offline_sqlite, set_tier_price_mysql, set_tier_price_sqlite, take_offline_mysql,
    take_offline_sqlite,
};
