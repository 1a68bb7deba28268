// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{BookingRequest, plan_booking};
use marquee_domain::{
    Booking, BookingId, CustomerDetails, EventSnapshot, ReservationToken, TierLabel,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub const EVENT_DATE: OffsetDateTime = datetime!(2026-12-31 20:00 UTC);
pub const BOOKED_AT: OffsetDateTime = datetime!(2026-06-01 12:00:00.750 UTC);
pub const OWNER_ID: i64 = 10;

pub fn create_test_token(quantity: u32, unit_price: u64) -> ReservationToken {
    ReservationToken {
        event_id: 1,
        tier: TierLabel::Regular,
        quantity,
        unit_price,
        event: EventSnapshot {
            title: String::from("Test Show"),
            starts_at: EVENT_DATE,
            venue_name: String::from("Main Hall"),
        },
    }
}

pub fn create_test_request() -> BookingRequest {
    BookingRequest {
        booking_id: BookingId::new("BK-1780315200750-0123456789ABCDEF").unwrap(),
        account_id: OWNER_ID,
        customer: CustomerDetails {
            name: String::from("Jane Doe"),
            email: String::from("jane@example.com"),
            phone: String::from("555-0100"),
        },
    }
}

pub fn create_test_booking() -> Booking {
    plan_booking(
        &create_test_token(2, 5000),
        create_test_request(),
        BOOKED_AT,
    )
    .unwrap()
    .new_booking
}
