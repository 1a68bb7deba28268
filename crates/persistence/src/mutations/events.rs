// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Event catalog mutations.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use marquee_domain::{EventStatus, NewEvent};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{to_column_i32, to_column_i64};
use crate::diesel_schema::{events, ticket_tiers};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts an event and its ticket tiers.
///
/// The event row and every tier row are written in one transaction. Tiers
/// keep the order they have in `event.tiers`.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `event` - The validated event definition
/// * `now` - Creation instant
///
/// # Returns
///
/// The identifier assigned to the new event.
///
/// # Errors
///
/// Returns an error if a value does not fit its column or the insert fails.
pub fn create_event(
    conn: &mut _,
    event: &NewEvent,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let artists_json: String = serde_json::to_string(&event.artists)?;
    let capacity: i32 = to_column_i32(event.venue.capacity, "venue_capacity")?;
    let now_ts: i64 = now.unix_timestamp();

    conn.transaction::<i64, PersistenceError, _>(|conn| {
        diesel::insert_into(events::table)
            .values((
                events::title.eq(&event.title),
                events::description.eq(&event.description),
                events::starts_at.eq(event.starts_at.unix_timestamp()),
                events::venue_name.eq(&event.venue.name),
                events::venue_address.eq(&event.venue.address),
                events::venue_capacity.eq(capacity),
                events::status.eq(EventStatus::Upcoming.as_str()),
                events::featured.eq(i32::from(event.featured)),
                events::category.eq(event.category.as_str()),
                events::duration.eq(&event.duration),
                events::artists_json.eq(&artists_json),
                events::created_at.eq(now_ts),
                events::updated_at.eq(now_ts),
            ))
            .execute(conn)?;

        let event_id: i64 = conn.get_last_insert_rowid()?;

        for (position, tier) in event.tiers.iter().enumerate() {
            let position: i32 = i32::try_from(position)
                .map_err(|_| PersistenceError::OutOfRange(format!("tier position {position}")))?;
            // Sales recorded before the event entered the catalog have no booking.
            let sold: i32 = to_column_i32(tier.sold(), "sold")?;
            diesel::insert_into(ticket_tiers::table)
                .values((
                    ticket_tiers::event_id.eq(event_id),
                    ticket_tiers::tier_label.eq(tier.label().as_str()),
                    ticket_tiers::position.eq(position),
                    ticket_tiers::price.eq(to_column_i64(tier.price(), "price")?),
                    ticket_tiers::total.eq(to_column_i32(tier.total(), "total")?),
                    ticket_tiers::sold.eq(sold),
                    ticket_tiers::offline.eq(sold),
                    ticket_tiers::features_json.eq(serde_json::to_string(tier.features())?),
                ))
                .execute(conn)?;
        }

        info!(event_id, title = %event.title, tiers = event.tiers.len(), "Created event");
        Ok(event_id)
    })
}
}

backend_fn! {
/// Moves an event from `from` to `to`.
///
/// The update only applies while the event is still in `from`, so two
/// administrators racing on the same event cannot both succeed.
///
/// # Returns
///
/// `true` if the event was updated, `false` if it was not in `from`.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_event_status(
    conn: &mut _,
    event_id: i64,
    from: EventStatus,
    to: EventStatus,
    now: OffsetDateTime,
) -> Result<bool, PersistenceError> {
    debug!(event_id, from = %from, to = %to, "Updating event status");

    let updated: usize = diesel::update(events::table)
        .filter(events::event_id.eq(event_id))
        .filter(events::status.eq(from.as_str()))
        .set((
            events::status.eq(to.as_str()),
            events::updated_at.eq(now.unix_timestamp()),
        ))
        .execute(conn)?;

    if updated > 0 {
        info!(event_id, status = %to, "Event status changed");
    }
    Ok(updated > 0)
}
}
