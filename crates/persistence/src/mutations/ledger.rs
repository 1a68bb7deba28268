// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Inventory ledger mutations.
//!
//! The ledger is the only writer of `ticket_tiers.sold` and
//! `ticket_tiers.offline`. Every change is a single guarded `UPDATE` whose
//! `WHERE` clause encodes the invariant (`sold + q <= total`,
//! `sold - offline >= q`, `offline >= q`), executed as the first statement of a
//! transaction so the row lock is taken before anything is read. When the
//! guard matches no row, the reason is diagnosed afterwards inside the same
//! transaction.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use marquee_domain::{
    DomainError, EventSnapshot, EventStatus, ReservationToken, TierLabel, TierLevels,
};
use num_traits::ToPrimitive;
use std::str::FromStr;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::data_models::{to_column_i32, to_column_i64, to_instant, to_u32, to_u64};
use crate::diesel_schema::{events, ticket_tiers};
use crate::error::PersistenceError;

backend_fn! {
/// Reads the status and start time of an event.
fn lookup_event_state(
    conn: &mut _,
    event_id: i64,
) -> Result<Option<(EventStatus, i64)>, PersistenceError> {
    let row: Option<(String, i64)> = events::table
        .filter(events::event_id.eq(event_id))
        .select((events::status, events::starts_at))
        .first(conn)
        .optional()?;

    row.map(|(status, starts_at)| {
        EventStatus::from_str(&status)
            .map(|status| (status, starts_at))
            .map_err(|e| PersistenceError::InvalidRow(e.to_string()))
    })
    .transpose()
}
}

backend_fn! {
/// Reads the current counters of one tier.
fn lookup_tier_levels(
    conn: &mut _,
    event_id: i64,
    tier: TierLabel,
) -> Result<Option<TierLevels>, PersistenceError> {
    let row: Option<(i64, i32, i32, i32)> = ticket_tiers::table
        .filter(ticket_tiers::event_id.eq(event_id))
        .filter(ticket_tiers::tier_label.eq(tier.as_str()))
        .select((
            ticket_tiers::price,
            ticket_tiers::total,
            ticket_tiers::sold,
            ticket_tiers::offline,
        ))
        .first(conn)
        .optional()?;

    row.map(|(price, total, sold, offline)| {
        Ok(TierLevels {
            tier,
            price: to_u64(price, "price")?,
            total: to_u32(total, "total")?,
            sold: to_u32(sold, "sold")?,
            offline: to_u32(offline, "offline")?,
        })
    })
    .transpose()
}
}

/// Reads the ledger needs while its transaction is open.
///
/// Implemented for every backend connection so the guarded mutations below
/// can diagnose a rejected update without leaving their transaction.
trait LedgerLookups {
    fn event_state(&mut self, event_id: i64)
    -> Result<Option<(EventStatus, i64)>, PersistenceError>;

    fn tier_levels(
        &mut self,
        event_id: i64,
        tier: TierLabel,
    ) -> Result<Option<TierLevels>, PersistenceError>;

    /// Returns the tier counters, or `EventNotFound`/`TierNotFound`.
    fn existing_tier(
        &mut self,
        event_id: i64,
        tier: TierLabel,
    ) -> Result<TierLevels, PersistenceError> {
        if self.event_state(event_id)?.is_none() {
            return Err(DomainError::EventNotFound(event_id).into());
        }
        self.tier_levels(event_id, tier)?
            .ok_or_else(|| DomainError::TierNotFound { event_id, tier }.into())
    }
}

impl LedgerLookups for SqliteConnection {
    fn event_state(
        &mut self,
        event_id: i64,
    ) -> Result<Option<(EventStatus, i64)>, PersistenceError> {
        lookup_event_state_sqlite(self, event_id)
    }

    fn tier_levels(
        &mut self,
        event_id: i64,
        tier: TierLabel,
    ) -> Result<Option<TierLevels>, PersistenceError> {
        lookup_tier_levels_sqlite(self, event_id, tier)
    }
}

impl LedgerLookups for MysqlConnection {
    fn event_state(
        &mut self,
        event_id: i64,
    ) -> Result<Option<(EventStatus, i64)>, PersistenceError> {
        lookup_event_state_mysql(self, event_id)
    }

    fn tier_levels(
        &mut self,
        event_id: i64,
        tier: TierLabel,
    ) -> Result<Option<TierLevels>, PersistenceError> {
        lookup_tier_levels_mysql(self, event_id, tier)
    }
}

/// Explains why a guarded reservation matched no row.
///
/// Checks in order: event exists, event bookable, tier exists, capacity.
fn explain_rejected_reservation(
    conn: &mut impl LedgerLookups,
    event_id: i64,
    tier: TierLabel,
    quantity: u32,
    now_ts: Option<i64>,
) -> PersistenceError {
    let state: Option<(EventStatus, i64)> = match conn.event_state(event_id) {
        Ok(state) => state,
        Err(e) => return e,
    };
    let Some((status, starts_at)) = state else {
        return DomainError::EventNotFound(event_id).into();
    };

    if let Some(now_ts) = now_ts {
        if status != EventStatus::Upcoming {
            return DomainError::EventNotBookable {
                event_id,
                reason: format!("status is '{status}'"),
            }
            .into();
        }
        if starts_at <= now_ts {
            return DomainError::EventNotBookable {
                event_id,
                reason: String::from("event has already started"),
            }
            .into();
        }
    }

    match conn.tier_levels(event_id, tier) {
        Ok(Some(levels)) => DomainError::InsufficientInventory {
            tier,
            requested: quantity,
            available: levels.available(),
        }
        .into(),
        Ok(None) => DomainError::TierNotFound { event_id, tier }.into(),
        Err(e) => e,
    }
}

/// Converts a requested quantity into a column delta.
///
/// Quantities that do not fit the counter column can never be satisfied.
fn quantity_delta(quantity: u32) -> Result<i32, PersistenceError> {
    if quantity == 0 {
        return Err(DomainError::InvalidQuantity(quantity).into());
    }
    quantity
        .to_i32()
        .ok_or_else(|| DomainError::InvalidQuantity(quantity).into())
}

backend_fn! {
/// Reserves `quantity` tickets of a tier.
///
/// The event must be `upcoming` and start after `now`. The reservation and
/// all of its preconditions are a single conditional `UPDATE`, so two
/// concurrent requests for the last ticket cannot both succeed.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `event_id` - The event to reserve from
/// * `tier` - The tier to reserve from
/// * `quantity` - Number of tickets (at least 1)
/// * `now` - The current instant
///
/// # Returns
///
/// A `ReservationToken` carrying the unit price and event details at the
/// moment of reservation.
///
/// # Errors
///
/// Returns `PersistenceError::Domain` with `EventNotFound`,
/// `EventNotBookable`, `TierNotFound`, `InsufficientInventory` or
/// `InvalidQuantity`, or a database error.
pub fn reserve(
    conn: &mut _,
    event_id: i64,
    tier: TierLabel,
    quantity: u32,
    now: OffsetDateTime,
) -> Result<ReservationToken, PersistenceError> {
    let delta: i32 = quantity_delta(quantity)?;
    let now_ts: i64 = now.unix_timestamp();

    conn.transaction::<ReservationToken, PersistenceError, _>(|conn| {
        let bookable_events = events::table
            .filter(events::event_id.eq(event_id))
            .filter(events::status.eq(EventStatus::Upcoming.as_str()))
            .filter(events::starts_at.gt(now_ts))
            .select(events::event_id);

        let updated: usize = diesel::update(ticket_tiers::table)
            .filter(ticket_tiers::event_id.eq_any(bookable_events))
            .filter(ticket_tiers::tier_label.eq(tier.as_str()))
            .filter((ticket_tiers::sold + delta).le(ticket_tiers::total))
            .set(ticket_tiers::sold.eq(ticket_tiers::sold + delta))
            .execute(conn)?;

        if updated == 0 {
            let rejection: PersistenceError =
                explain_rejected_reservation(conn, event_id, tier, quantity, Some(now_ts));
            debug!(event_id, tier = %tier, quantity, reason = %rejection, "Reservation rejected");
            return Err(rejection);
        }

        let price: i64 = ticket_tiers::table
            .filter(ticket_tiers::event_id.eq(event_id))
            .filter(ticket_tiers::tier_label.eq(tier.as_str()))
            .select(ticket_tiers::price)
            .first(conn)?;
        let (title, starts_at, venue_name): (String, i64, String) = events::table
            .filter(events::event_id.eq(event_id))
            .select((events::title, events::starts_at, events::venue_name))
            .first(conn)?;

        info!(event_id, tier = %tier, quantity, "Reserved tickets");

        Ok(ReservationToken {
            event_id,
            tier,
            quantity,
            unit_price: to_u64(price, "price")?,
            event: EventSnapshot {
                title,
                starts_at: to_instant(starts_at, "starts_at")?,
                venue_name,
            },
        })
    })
}
}

backend_fn! {
/// Returns `quantity` booked tickets to a tier.
///
/// Only booked tickets are returned. When fewer than `quantity` are booked
/// the sold count is clamped to the offline count, so availability never
/// exceeds capacity and offline tickets stay out of sale. Idempotency is the
/// caller's responsibility.
///
/// # Errors
///
/// Returns `EventNotFound`/`TierNotFound` (as `PersistenceError::Domain`)
/// or a database error.
pub fn release(
    conn: &mut _,
    event_id: i64,
    tier: TierLabel,
    quantity: u32,
) -> Result<TierLevels, PersistenceError> {
    let delta: i32 = to_column_i32(quantity, "quantity")?;

    conn.transaction::<TierLevels, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(ticket_tiers::table)
            .filter(ticket_tiers::event_id.eq(event_id))
            .filter(ticket_tiers::tier_label.eq(tier.as_str()))
            .filter((ticket_tiers::sold - ticket_tiers::offline).ge(delta))
            .set(ticket_tiers::sold.eq(ticket_tiers::sold - delta))
            .execute(conn)?;

        if updated == 0 {
            let levels: TierLevels = conn.existing_tier(event_id, tier)?;
            warn!(
                event_id,
                tier = %tier,
                requested = quantity,
                booked = levels.booked(),
                "Release exceeds booked count; clamping sold to the offline count"
            );
            diesel::update(ticket_tiers::table)
                .filter(ticket_tiers::event_id.eq(event_id))
                .filter(ticket_tiers::tier_label.eq(tier.as_str()))
                .set(ticket_tiers::sold.eq(ticket_tiers::offline))
                .execute(conn)?;
        }

        let levels: TierLevels = conn.existing_tier(event_id, tier)?;
        info!(event_id, tier = %tier, quantity, available = levels.available(), "Released tickets");
        Ok(levels)
    })
}
}

backend_fn! {
/// Grants extra tickets without a booking (offline sales).
///
/// Same guard as `reserve` but without the bookability check. The tickets
/// count towards both `sold` and `offline`.
///
/// # Errors
///
/// Returns `EventNotFound`, `TierNotFound` or `InsufficientInventory` (as
/// `PersistenceError::Domain`) or a database error.
pub fn take_offline(
    conn: &mut _,
    event_id: i64,
    tier: TierLabel,
    quantity: u32,
) -> Result<TierLevels, PersistenceError> {
    let delta: i32 = quantity_delta(quantity)?;

    conn.transaction::<TierLevels, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(ticket_tiers::table)
            .filter(ticket_tiers::event_id.eq(event_id))
            .filter(ticket_tiers::tier_label.eq(tier.as_str()))
            .filter((ticket_tiers::sold + delta).le(ticket_tiers::total))
            .set((
                ticket_tiers::sold.eq(ticket_tiers::sold + delta),
                ticket_tiers::offline.eq(ticket_tiers::offline + delta),
            ))
            .execute(conn)?;

        if updated == 0 {
            return Err(explain_rejected_reservation(conn, event_id, tier, quantity, None));
        }

        let levels: TierLevels = conn.existing_tier(event_id, tier)?;
        info!(
            event_id,
            tier = %tier,
            quantity,
            available = levels.available(),
            "Took tickets offline"
        );
        Ok(levels)
    })
}
}

backend_fn! {
/// Puts tickets previously taken offline back on sale.
///
/// Booked tickets are never touched: the update only matches while the tier
/// holds at least `quantity` offline tickets.
///
/// # Errors
///
/// Returns `EventNotFound`, `TierNotFound`, `InsufficientOfflineTickets` or
/// `InvalidQuantity` (as `PersistenceError::Domain`) or a database error.
pub fn return_offline(
    conn: &mut _,
    event_id: i64,
    tier: TierLabel,
    quantity: u32,
) -> Result<TierLevels, PersistenceError> {
    let delta: i32 = quantity_delta(quantity)?;

    conn.transaction::<TierLevels, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(ticket_tiers::table)
            .filter(ticket_tiers::event_id.eq(event_id))
            .filter(ticket_tiers::tier_label.eq(tier.as_str()))
            .filter(ticket_tiers::offline.ge(delta))
            .set((
                ticket_tiers::sold.eq(ticket_tiers::sold - delta),
                ticket_tiers::offline.eq(ticket_tiers::offline - delta),
            ))
            .execute(conn)?;

        if updated == 0 {
            let levels: TierLevels = conn.existing_tier(event_id, tier)?;
            debug!(
                event_id,
                tier = %tier,
                quantity,
                offline = levels.offline,
                "Offline return rejected"
            );
            return Err(DomainError::InsufficientOfflineTickets {
                tier,
                requested: quantity,
                offline: levels.offline,
            }
            .into());
        }

        let levels: TierLevels = conn.existing_tier(event_id, tier)?;
        info!(
            event_id,
            tier = %tier,
            quantity,
            available = levels.available(),
            "Returned offline tickets to sale"
        );
        Ok(levels)
    })
}
}

backend_fn! {
/// Changes the current price of a tier.
///
/// Existing bookings keep the price they were made at.
///
/// # Errors
///
/// Returns `EventNotFound`/`TierNotFound` (as `PersistenceError::Domain`)
/// or a database error.
pub fn set_tier_price(
    conn: &mut _,
    event_id: i64,
    tier: TierLabel,
    price: u64,
    now: OffsetDateTime,
) -> Result<TierLevels, PersistenceError> {
    let price_column: i64 = to_column_i64(price, "price")?;

    conn.transaction::<TierLevels, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(ticket_tiers::table)
            .filter(ticket_tiers::event_id.eq(event_id))
            .filter(ticket_tiers::tier_label.eq(tier.as_str()))
            .set(ticket_tiers::price.eq(price_column))
            .execute(conn)?;

        if updated == 0 {
            return Err(match conn.existing_tier(event_id, tier) {
                Err(e) => e,
                Ok(_) => PersistenceError::Other(format!(
                    "price update for event {event_id} tier '{tier}' matched no row"
                )),
            });
        }

        diesel::update(events::table)
            .filter(events::event_id.eq(event_id))
            .set(events::updated_at.eq(now.unix_timestamp()))
            .execute(conn)?;

        info!(event_id, tier = %tier, price, "Updated tier price");
        conn.existing_tier(event_id, tier)
    })
}
}
