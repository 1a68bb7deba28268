// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use marquee_domain::{Artist, CustomerDetails, Venue};
use marquee_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{
    AuthenticatedActor, BookingInfo, CreateBookingRequest, CreateEventRequest, EventInfo, Role,
    TierInput, create_booking, create_event,
};

/// Instant at which test requests are made.
pub const NOW: OffsetDateTime = datetime!(2026-06-01 12:00 UTC);

/// Start of the default test event.
pub const EVENT_DATE: OffsetDateTime = datetime!(2026-12-31 20:00 UTC);

/// Cancellation deadline of bookings for the default test event.
pub const DEADLINE: OffsetDateTime = datetime!(2026-12-30 20:00 UTC);

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

fn create_actor(persistence: &mut Persistence, login: &str, role: Role) -> AuthenticatedActor {
    let account_id: i64 = persistence
        .create_account(login, "Test Account", "correct horse", role.as_str(), NOW)
        .expect("account insert");
    AuthenticatedActor::new(account_id, login.to_string(), role)
}

pub fn create_test_admin(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(persistence, "admin@example.com", Role::Admin)
}

pub fn create_test_customer(persistence: &mut Persistence, login: &str) -> AuthenticatedActor {
    create_actor(persistence, login, Role::Customer)
}

pub fn create_test_customer_details() -> CustomerDetails {
    CustomerDetails {
        name: String::from("Ada Lovelace"),
        email: String::from("ada@example.com"),
        phone: String::from("+44 20 7946 0000"),
    }
}

/// An event request with a Regular tier ($50) and a VIP tier ($150, 5 seats).
pub fn create_test_event_request(title: &str, regular_total: u32) -> CreateEventRequest {
    CreateEventRequest {
        title: title.to_string(),
        description: String::from("An evening of loud music"),
        date: String::from("2026-12-31T20:00:00Z"),
        venue: Venue {
            name: String::from("Riverside Arena"),
            address: String::from("1 River Road"),
            capacity: 5_000,
        },
        artists: vec![Artist {
            name: String::from("The Testers"),
            genre: Some(String::from("Rock")),
        }],
        tiers: vec![
            TierInput {
                tier_label: String::from("Regular"),
                price: 5_000,
                total: regular_total,
                sold: 0,
                features: Vec::new(),
            },
            TierInput {
                tier_label: String::from("VIP"),
                price: 15_000,
                total: 5,
                sold: 0,
                features: vec![String::from("Premium Seating")],
            },
        ],
        featured: false,
        category: String::from("Concert"),
        duration: String::from("3 hours"),
    }
}

/// Creates the "Test Show" event through the catalog and returns it.
pub fn create_test_event(
    persistence: &mut Persistence,
    admin: &AuthenticatedActor,
    regular_total: u32,
) -> EventInfo {
    create_event(
        persistence,
        create_test_event_request("Test Show", regular_total),
        admin,
        NOW,
    )
    .expect("event creation")
}

pub fn create_booking_request(event_id: i64, tier: &str, quantity: u32) -> CreateBookingRequest {
    CreateBookingRequest {
        event_id,
        tier_label: tier.to_string(),
        quantity,
        customer_details: create_test_customer_details(),
        booking_id: None,
    }
}

/// Books Regular tickets at `NOW`.
pub fn book_regular(
    persistence: &mut Persistence,
    event_id: i64,
    actor: &AuthenticatedActor,
    quantity: u32,
) -> BookingInfo {
    create_booking(
        persistence,
        create_booking_request(event_id, "Regular", quantity),
        actor,
        NOW,
    )
    .expect("booking")
}

/// Regular tier availability as reported by the catalog.
pub fn regular_available(persistence: &mut Persistence, event_id: i64) -> u32 {
    crate::get_event(persistence, event_id)
        .expect("event")
        .tiers
        .iter()
        .find(|tier| tier.tier_label == "Regular")
        .expect("regular tier")
        .available
}
