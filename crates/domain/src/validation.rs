// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking::CustomerDetails;
use crate::error::DomainError;
use crate::types::{NewEvent, TierLabel};
use std::collections::HashSet;
use time::OffsetDateTime;

/// Validates the contact details attached to a booking request.
///
/// # Arguments
///
/// * `details` - The customer details to validate
///
/// # Errors
///
/// Returns an error if:
/// - The name, email or phone is empty after trimming
/// - The email does not contain `@`
pub fn validate_customer_details(details: &CustomerDetails) -> Result<(), DomainError> {
    if details.name.trim().is_empty() {
        return Err(DomainError::InvalidCustomerDetails {
            field: "name",
            reason: String::from("cannot be empty"),
        });
    }

    if details.email.trim().is_empty() {
        return Err(DomainError::InvalidCustomerDetails {
            field: "email",
            reason: String::from("cannot be empty"),
        });
    }

    if !details.email.contains('@') {
        return Err(DomainError::InvalidCustomerDetails {
            field: "email",
            reason: format!("'{}' is not an email address", details.email),
        });
    }

    if details.phone.trim().is_empty() {
        return Err(DomainError::InvalidCustomerDetails {
            field: "phone",
            reason: String::from("cannot be empty"),
        });
    }

    Ok(())
}

/// Validates a requested ticket quantity.
///
/// # Errors
///
/// Returns `DomainError::InvalidQuantity` if `quantity` is zero.
pub const fn validate_quantity(quantity: u32) -> Result<(), DomainError> {
    if quantity == 0 {
        return Err(DomainError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Validates an event definition before it is stored.
///
/// Tier invariants (`total > 0`, `sold <= total`) are enforced when the
/// tiers are constructed; this checks the event as a whole.
///
/// # Arguments
///
/// * `event` - The event to validate
/// * `now` - The current instant
///
/// # Errors
///
/// Returns an error if:
/// - The title, description, venue name or venue address is empty
/// - The venue capacity is zero
/// - The event has no tiers, or a tier label appears twice
/// - The sum of tier capacities exceeds the venue capacity
/// - The event does not start after `now`
pub fn validate_new_event(event: &NewEvent, now: OffsetDateTime) -> Result<(), DomainError> {
    let required = [
        ("title", &event.title),
        ("description", &event.description),
        ("venue name", &event.venue.name),
        ("venue address", &event.venue.address),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(DomainError::InvalidEvent {
                field,
                reason: String::from("cannot be empty"),
            });
        }
    }

    if event.venue.capacity == 0 {
        return Err(DomainError::InvalidEvent {
            field: "venue capacity",
            reason: String::from("must be greater than 0"),
        });
    }

    if event.tiers.is_empty() {
        return Err(DomainError::InvalidEvent {
            field: "tiers",
            reason: String::from("at least one ticket tier is required"),
        });
    }

    let mut seen: HashSet<TierLabel> = HashSet::new();
    for tier in &event.tiers {
        if !seen.insert(tier.label()) {
            return Err(DomainError::DuplicateTier(tier.label()));
        }
    }

    let tier_capacity: u64 = event.tiers.iter().map(|t| u64::from(t.total())).sum();
    if tier_capacity > u64::from(event.venue.capacity) {
        return Err(DomainError::InvalidEvent {
            field: "tiers",
            reason: format!(
                "tier capacity {tier_capacity} exceeds venue capacity {}",
                event.venue.capacity
            ),
        });
    }

    if event.starts_at <= now {
        return Err(DomainError::InvalidEvent {
            field: "date",
            reason: String::from("must be in the future"),
        });
    }

    Ok(())
}
