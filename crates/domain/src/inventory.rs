// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{EventSnapshot, TierLabel};
use time::OffsetDateTime;

/// Proof that the inventory ledger has set aside tickets.
///
/// Returned by a successful reservation. The holder owns the reserved
/// quantity until it either persists a booking or releases the tickets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationToken {
    pub event_id: i64,
    pub tier: TierLabel,
    pub quantity: u32,
    /// Tier price at the moment of reservation.
    pub unit_price: u64,
    /// Event details at the moment of reservation.
    pub event: EventSnapshot,
}

impl ReservationToken {
    /// Scheduled start of the reserved event.
    #[must_use]
    pub const fn event_date(&self) -> OffsetDateTime {
        self.event.starts_at
    }
}

/// Tier counters after a ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLevels {
    pub tier: TierLabel,
    pub price: u64,
    pub total: u32,
    pub sold: u32,
    /// Part of `sold` taken offline by an administrator rather than booked.
    pub offline: u32,
}

impl TierLevels {
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.total.saturating_sub(self.sold)
    }

    /// Tickets held by bookings.
    #[must_use]
    pub const fn booked(&self) -> u32 {
        self.sold.saturating_sub(self.offline)
    }
}
