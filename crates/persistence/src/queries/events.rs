// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Event catalog queries.
//!
//! Events are always returned with their tiers, in tier display order.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use marquee_domain::{Event, EventStatus};
use tracing::debug;

use crate::data_models::{EventRow, TierRow, assemble_events};
use crate::diesel_schema::{events, ticket_tiers};
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves an event with its tiers.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is invalid.
/// Returns `Ok(None)` if the event does not exist.
pub fn get_event(conn: &mut _, event_id: i64) -> Result<Option<Event>, PersistenceError> {
    debug!(event_id, "Looking up event");

    let row: Option<EventRow> = events::table
        .filter(events::event_id.eq(event_id))
        .select(EventRow::as_select())
        .first(conn)
        .optional()?;

    let Some(row) = row else {
        return Ok(None);
    };

    let tiers: Vec<TierRow> = ticket_tiers::table
        .filter(ticket_tiers::event_id.eq(event_id))
        .order(ticket_tiers::position.asc())
        .select(TierRow::as_select())
        .load(conn)?;

    row.into_event(tiers).map(Some)
}
}

backend_fn! {
/// Lists events with the given status, soonest first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `status` - Status to match
/// * `featured_only` - Restrict to featured events
///
/// # Errors
///
/// Returns an error if the database query fails or a row is invalid.
pub fn list_events(
    conn: &mut _,
    status: EventStatus,
    featured_only: bool,
) -> Result<Vec<Event>, PersistenceError> {
    let mut query = events::table
        .filter(events::status.eq(status.as_str()))
        .into_boxed();
    if featured_only {
        query = query.filter(events::featured.eq(1));
    }

    let rows: Vec<EventRow> = query
        .order((events::starts_at.asc(), events::event_id.asc()))
        .select(EventRow::as_select())
        .load(conn)?;

    let event_ids: Vec<i64> = rows.iter().map(|row| row.event_id).collect();
    let tiers: Vec<TierRow> = ticket_tiers::table
        .filter(ticket_tiers::event_id.eq_any(&event_ids))
        .select(TierRow::as_select())
        .load(conn)?;

    debug!(status = %status, featured_only, count = rows.len(), "Listed events");
    assemble_events(rows, tiers)
}
}
