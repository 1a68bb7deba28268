// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod concurrency_tests;
mod initialization_tests;

use crate::Persistence;
use marquee::{BookingRequest, BookingTransition, generate_booking_id, plan_booking};
use marquee_domain::{
    Artist, Booking, BookingId, CustomerDetails, EventCategory, NewEvent, ReservationToken,
    TicketTier, TierLabel, Venue,
};
use time::OffsetDateTime;
use time::macros::datetime;

/// Instant at which test bookings are made.
pub const NOW: OffsetDateTime = datetime!(2026-06-01 12:00 UTC);

/// Start of the default test event.
pub const EVENT_DATE: OffsetDateTime = datetime!(2026-12-31 20:00 UTC);

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

/// Builds an event with a Regular tier ($50) and a VIP tier ($150, 5 seats).
pub fn create_test_event(title: &str, regular_total: u32) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: String::from("An evening of loud music"),
        starts_at: EVENT_DATE,
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
            TicketTier::new(TierLabel::Regular, 5_000, regular_total).unwrap(),
            TicketTier::new(TierLabel::Vip, 15_000, 5)
                .unwrap()
                .with_features(vec![String::from("Premium Seating")]),
        ],
        featured: false,
        category: EventCategory::Concert,
        duration: String::from("3 hours"),
    }
}

/// Stores the default test event and returns its id.
pub fn insert_test_event(persistence: &mut Persistence, regular_total: u32) -> i64 {
    persistence
        .create_event(&create_test_event("Test Show", regular_total), NOW)
        .expect("event insert")
}

pub fn create_test_account(persistence: &mut Persistence, login: &str) -> i64 {
    persistence
        .create_account(login, "Test Customer", "correct horse", "Customer", NOW)
        .expect("account insert")
}

pub fn create_test_customer() -> CustomerDetails {
    CustomerDetails {
        name: String::from("Ada Lovelace"),
        email: String::from("ada@example.com"),
        phone: String::from("+44 20 7946 0000"),
    }
}

/// Plans a booking for a reservation without storing it.
pub fn plan_test_booking(token: &ReservationToken, account_id: i64) -> BookingTransition {
    let booking_id: BookingId = generate_booking_id(NOW).unwrap();
    plan_booking(
        token,
        BookingRequest {
            booking_id,
            account_id,
            customer: create_test_customer(),
        },
        NOW,
    )
    .unwrap()
}

/// Reserves, plans and stores a booking.
pub fn book(
    persistence: &mut Persistence,
    event_id: i64,
    account_id: i64,
    tier: TierLabel,
    quantity: u32,
) -> Booking {
    let token: ReservationToken = persistence.reserve(event_id, tier, quantity, NOW).unwrap();
    let transition: BookingTransition = plan_test_booking(&token, account_id);
    persistence.insert_booking(&transition).unwrap();
    transition.new_booking
}
