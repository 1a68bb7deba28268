// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    DEADLINE, EVENT_DATE, NOW, book_regular, create_booking_request, create_test_admin,
    create_test_customer, create_test_event, create_test_persistence, regular_available,
};
use crate::{
    ApiError, AuthenticatedActor, Role, SetTierPriceRequest, cancel_booking, create_booking,
    get_booking, set_tier_price,
};
use time::Duration;

#[test]
fn test_create_booking_reserves_and_records() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let customer = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);

    let booking = book_regular(&mut persistence, event.event_id, &customer, 4);

    assert!(booking.booking_id.starts_with("BK-"));
    assert_eq!(booking.event_id, event.event_id);
    assert_eq!(booking.account_id, customer.account_id);
    assert_eq!(booking.tier_label, "Regular");
    assert_eq!(booking.unit_price, 5_000);
    assert_eq!(booking.total_price, 20_000);
    assert_eq!(booking.booking_status, "confirmed");
    assert_eq!(booking.payment_status, "pending");
    assert_eq!(booking.cancellation_deadline, "2026-12-30T20:00:00Z");
    assert!(booking.can_cancel);
    assert!(booking.qr_code.starts_with("data:image/svg+xml;base64,"));
    assert!(booking.proof_payload.contains(&booking.booking_id));
    assert_eq!(booking.event.title, "Test Show");
    assert_eq!(booking.event.venue_name, "Riverside Arena");
    assert_eq!(regular_available(&mut persistence, event.event_id), 6);
}

#[test]
fn test_create_booking_insufficient_inventory_leaves_counts() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let customer = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 3);

    let err = create_booking(
        &mut persistence,
        create_booking_request(event.event_id, "Regular", 4),
        &customer,
        NOW,
    )
    .unwrap_err();

    assert_eq!(
        err,
        ApiError::InsufficientInventory {
            requested: 4,
            available: 3,
            message: String::from(
                "Not enough 'Regular' tickets available: requested 4, available 3"
            ),
        }
    );
    assert_eq!(err.kind(), "insufficient_inventory");
    assert_eq!(regular_available(&mut persistence, event.event_id), 3);
}

#[test]
fn test_create_booking_validation_failures_are_invalid_input() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let customer = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);

    let zero = create_booking_request(event.event_id, "Regular", 0);
    let mut bad_email = create_booking_request(event.event_id, "Regular", 1);
    bad_email.customer_details.email = String::from("not-an-email");
    let mut blank_phone = create_booking_request(event.event_id, "Regular", 1);
    blank_phone.customer_details.phone = String::from("  ");
    let unknown_tier = create_booking_request(event.event_id, "Balcony", 1);

    for request in [zero, bad_email, blank_phone, unknown_tier] {
        let err = create_booking(&mut persistence, request, &customer, NOW).unwrap_err();
        assert_eq!(err.kind(), "invalid_input", "{err}");
    }
    assert_eq!(regular_available(&mut persistence, event.event_id), 10);
}

#[test]
fn test_create_booking_unknown_event_and_tier_are_not_found() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let customer = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);

    let missing_event = create_booking(
        &mut persistence,
        create_booking_request(event.event_id + 100, "Regular", 1),
        &customer,
        NOW,
    )
    .unwrap_err();
    assert_eq!(missing_event.kind(), "not_found");

    let missing_tier = create_booking(
        &mut persistence,
        create_booking_request(event.event_id, "Backstage Pass", 1),
        &customer,
        NOW,
    )
    .unwrap_err();
    assert_eq!(missing_tier.kind(), "not_found");
}

#[test]
fn test_create_booking_after_start_is_not_bookable() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let customer = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);

    let err = create_booking(
        &mut persistence,
        create_booking_request(event.event_id, "Regular", 1),
        &customer,
        EVENT_DATE,
    )
    .unwrap_err();

    assert_eq!(err.kind(), "event_not_bookable");
    assert_eq!(regular_available(&mut persistence, event.event_id), 10);
}

#[test]
fn test_create_booking_replays_intended_id() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let customer = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);

    let mut request = create_booking_request(event.event_id, "Regular", 2);
    request.booking_id = Some(String::from("BK-client-0001"));

    let first = create_booking(&mut persistence, request.clone(), &customer, NOW).unwrap();
    let second = create_booking(
        &mut persistence,
        request,
        &customer,
        NOW + Duration::minutes(1),
    )
    .unwrap();

    assert_eq!(first.booking_id, "BK-client-0001");
    assert_eq!(second.booking_id, first.booking_id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(regular_available(&mut persistence, event.event_id), 8);
}

#[test]
fn test_create_booking_intended_id_of_other_account_is_rejected() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let ada = create_test_customer(&mut persistence, "ada@example.com");
    let bob = create_test_customer(&mut persistence, "bob@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);

    let mut request = create_booking_request(event.event_id, "Regular", 2);
    request.booking_id = Some(String::from("BK-client-0002"));
    create_booking(&mut persistence, request.clone(), &ada, NOW).unwrap();

    let err = create_booking(&mut persistence, request, &bob, NOW).unwrap_err();

    assert_eq!(err.kind(), "invalid_input");
    assert_eq!(regular_available(&mut persistence, event.event_id), 8);
}

#[test]
fn test_create_booking_malformed_intended_id_is_rejected() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let customer = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);

    let mut request = create_booking_request(event.event_id, "Regular", 1);
    request.booking_id = Some(String::from("order 17"));

    let err = create_booking(&mut persistence, request, &customer, NOW).unwrap_err();

    assert_eq!(err.kind(), "invalid_input");
    assert_eq!(regular_available(&mut persistence, event.event_id), 10);
}

#[test]
fn test_failed_store_after_reservation_releases_tickets() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let event = create_test_event(&mut persistence, &admin, 10);
    // No such account: the booking row violates its foreign key.
    let ghost = AuthenticatedActor::new(9_999, String::from("ghost@example.com"), Role::Customer);

    let err = create_booking(
        &mut persistence,
        create_booking_request(event.event_id, "Regular", 4),
        &ghost,
        NOW,
    )
    .unwrap_err();

    assert_eq!(err.kind(), "store_unavailable");
    assert_eq!(regular_available(&mut persistence, event.event_id), 10);
}

#[test]
fn test_test_show_book_then_cancel_restores_inventory() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let customer = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);

    let booking = book_regular(&mut persistence, event.event_id, &customer, 4);
    assert_eq!(regular_available(&mut persistence, event.event_id), 6);

    let cancelled =
        cancel_booking(&mut persistence, &booking.booking_id, &customer, NOW).unwrap();

    assert_eq!(cancelled.booking_status, "cancelled");
    assert_eq!(cancelled.payment_status, "refunded");
    assert!(!cancelled.can_cancel);
    assert_eq!(regular_available(&mut persistence, event.event_id), 10);
}

#[test]
fn test_second_cancel_is_rejected_without_releasing_again() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let customer = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);

    let first = book_regular(&mut persistence, event.event_id, &customer, 4);
    book_regular(&mut persistence, event.event_id, &customer, 3);
    cancel_booking(&mut persistence, &first.booking_id, &customer, NOW).unwrap();
    assert_eq!(regular_available(&mut persistence, event.event_id), 7);

    let err = cancel_booking(&mut persistence, &first.booking_id, &customer, NOW).unwrap_err();

    assert_eq!(err.kind(), "not_cancellable");
    assert_eq!(regular_available(&mut persistence, event.event_id), 7);
}

#[test]
fn test_cancel_at_deadline_fails_one_second_before_succeeds() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let customer = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);
    let booking = book_regular(&mut persistence, event.event_id, &customer, 2);

    let late = cancel_booking(&mut persistence, &booking.booking_id, &customer, DEADLINE)
        .unwrap_err();
    assert_eq!(late.kind(), "deadline_passed");
    assert_eq!(regular_available(&mut persistence, event.event_id), 8);

    let in_time = cancel_booking(
        &mut persistence,
        &booking.booking_id,
        &customer,
        DEADLINE - Duration::seconds(1),
    )
    .unwrap();
    assert_eq!(in_time.booking_status, "cancelled");
    assert_eq!(regular_available(&mut persistence, event.event_id), 10);
}

#[test]
fn test_cancel_unknown_booking_is_not_found() {
    let mut persistence = create_test_persistence();
    let customer = create_test_customer(&mut persistence, "ada@example.com");

    let err = cancel_booking(&mut persistence, "BK-missing", &customer, NOW).unwrap_err();

    assert_eq!(err.kind(), "not_found");
}

#[test]
fn test_price_change_does_not_touch_existing_booking() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let customer = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);

    let booking = book_regular(&mut persistence, event.event_id, &customer, 2);
    assert_eq!(booking.total_price, 10_000);

    set_tier_price(
        &mut persistence,
        event.event_id,
        &SetTierPriceRequest {
            tier_label: String::from("Regular"),
            price: 7_500,
        },
        &admin,
        NOW,
    )
    .unwrap();

    let stored = get_booking(&mut persistence, &booking.booking_id, &customer, NOW).unwrap();
    assert_eq!(stored.unit_price, 5_000);
    assert_eq!(stored.total_price, 10_000);

    let later = book_regular(&mut persistence, event.event_id, &customer, 2);
    assert_eq!(later.total_price, 15_000);
}
