// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// A priced category of ticket offered by an event.
///
/// Tier labels form a closed set; lookups by free-form string go through
/// `FromStr` and fail for anything unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TierLabel {
    /// General admission.
    #[serde(rename = "Regular")]
    Regular,
    /// Premium seating.
    #[serde(rename = "VIP")]
    Vip,
    /// Backstage access.
    #[serde(rename = "Backstage Pass")]
    BackstagePass,
}

impl TierLabel {
    /// Every tier label, in display order.
    pub const ALL: [Self; 3] = [Self::Regular, Self::Vip, Self::BackstagePass];

    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::Vip => "VIP",
            Self::BackstagePass => "Backstage Pass",
        }
    }
}

impl FromStr for TierLabel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Regular" => Ok(Self::Regular),
            "VIP" => Ok(Self::Vip),
            "Backstage Pass" => Ok(Self::BackstagePass),
            _ => Err(DomainError::InvalidTierLabel(s.to_string())),
        }
    }
}

impl std::fmt::Display for TierLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Scheduled and open for booking.
    #[default]
    Upcoming,
    /// Currently taking place.
    Ongoing,
    /// Finished.
    Completed,
    /// Called off by an administrator.
    Cancelled,
}

impl EventStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - Upcoming → Ongoing → Completed
    /// - any non-terminal status → Cancelled
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Upcoming, Self::Ongoing)
                | (Self::Ongoing, Self::Completed)
                | (Self::Upcoming | Self::Ongoing, Self::Cancelled)
        )
    }
}

impl FromStr for EventStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(Self::Upcoming),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidEventStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of event, used for browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EventCategory {
    #[default]
    #[serde(rename = "Concert")]
    Concert,
    #[serde(rename = "Festival")]
    Festival,
    #[serde(rename = "Live Show")]
    LiveShow,
    #[serde(rename = "DJ Night")]
    DjNight,
}

impl EventCategory {
    /// Converts this category to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Concert => "Concert",
            Self::Festival => "Festival",
            Self::LiveShow => "Live Show",
            Self::DjNight => "DJ Night",
        }
    }
}

impl FromStr for EventCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Concert" => Ok(Self::Concert),
            "Festival" => Ok(Self::Festival),
            "Live Show" => Ok(Self::LiveShow),
            "DJ Night" => Ok(Self::DjNight),
            _ => Err(DomainError::InvalidEventCategory(s.to_string())),
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an event takes place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub address: String,
    /// Maximum attendance across all tiers.
    pub capacity: u32,
}

/// A performer billed for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    pub genre: Option<String>,
}

/// A ticket tier embedded in an event.
///
/// `sold` is the source of truth; `available` is always derived as
/// `total - sold`. The constructor rejects `sold > total`, so a value of this
/// type always satisfies `0 <= available <= total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketTier {
    label: TierLabel,
    /// Unit price in minor currency units.
    price: u64,
    total: u32,
    sold: u32,
    features: Vec<String>,
}

impl TicketTier {
    /// Creates an unsold tier.
    ///
    /// # Errors
    ///
    /// Returns an error if `total` is zero.
    pub fn new(label: TierLabel, price: u64, total: u32) -> Result<Self, DomainError> {
        Self::with_sold(label, price, total, 0)
    }

    /// Creates a tier with an existing sold count.
    ///
    /// # Errors
    ///
    /// Returns an error if `total` is zero or `sold` exceeds `total`.
    pub fn with_sold(
        label: TierLabel,
        price: u64,
        total: u32,
        sold: u32,
    ) -> Result<Self, DomainError> {
        if total == 0 {
            return Err(DomainError::InvalidTier {
                tier: label,
                reason: String::from("total capacity must be greater than 0"),
            });
        }
        if sold > total {
            return Err(DomainError::InvalidTier {
                tier: label,
                reason: format!("sold count {sold} exceeds total capacity {total}"),
            });
        }
        Ok(Self {
            label,
            price,
            total,
            sold,
            features: Vec::new(),
        })
    }

    /// Attaches a list of marketing features to this tier.
    #[must_use]
    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.features = features;
        self
    }

    #[must_use]
    pub const fn label(&self) -> TierLabel {
        self.label
    }

    /// Unit price in minor currency units.
    #[must_use]
    pub const fn price(&self) -> u64 {
        self.price
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub const fn sold(&self) -> u32 {
        self.sold
    }

    /// Tickets still available (`total - sold`).
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.total - self.sold
    }

    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Checks whether `quantity` tickets could be taken from this tier.
    ///
    /// This is advisory only. The authoritative check is the guarded update
    /// performed by the inventory ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity` is zero or exceeds availability.
    pub const fn check_reservation(&self, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity(quantity));
        }
        if quantity > self.available() {
            return Err(DomainError::InsufficientInventory {
                tier: self.label,
                requested: quantity,
                available: self.available(),
            });
        }
        Ok(())
    }
}

/// A concert, festival or show with its ticket tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Identifier assigned by the store.
    pub event_id: i64,
    pub title: String,
    pub description: String,
    /// Scheduled start.
    pub starts_at: OffsetDateTime,
    pub venue: Venue,
    pub artists: Vec<Artist>,
    /// Tiers in display order, at most one per label.
    pub tiers: Vec<TicketTier>,
    pub status: EventStatus,
    pub featured: bool,
    pub category: EventCategory,
    /// Free-text running time, e.g. "3 hours".
    pub duration: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Event {
    /// Looks up a tier by label.
    #[must_use]
    pub fn tier(&self, label: TierLabel) -> Option<&TicketTier> {
        self.tiers.iter().find(|tier| tier.label() == label)
    }

    /// Sum of available tickets across all tiers.
    #[must_use]
    pub fn total_available_tickets(&self) -> u64 {
        self.tiers
            .iter()
            .map(|tier| u64::from(tier.available()))
            .sum()
    }

    /// Revenue if every ticket of every tier sold at the current price.
    #[must_use]
    pub fn total_revenue_potential(&self) -> u64 {
        self.tiers
            .iter()
            .map(|tier| tier.price().saturating_mul(u64::from(tier.total())))
            .fold(0_u64, u64::saturating_add)
    }

    /// Checks that the event accepts bookings at `now`.
    ///
    /// # Errors
    ///
    /// Returns `EventNotBookable` if the status is not `upcoming` or the
    /// event has already started.
    pub fn check_bookable(&self, now: OffsetDateTime) -> Result<(), DomainError> {
        if self.status != EventStatus::Upcoming {
            return Err(DomainError::EventNotBookable {
                event_id: self.event_id,
                reason: format!("status is '{}'", self.status),
            });
        }
        if self.starts_at <= now {
            return Err(DomainError::EventNotBookable {
                event_id: self.event_id,
                reason: String::from("event has already started"),
            });
        }
        Ok(())
    }

    /// Returns the snapshot stored on bookings for display.
    #[must_use]
    pub fn snapshot(&self) -> EventSnapshot {
        EventSnapshot {
            title: self.title.clone(),
            starts_at: self.starts_at,
            venue_name: self.venue.name.clone(),
        }
    }
}

/// An event definition that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub starts_at: OffsetDateTime,
    pub venue: Venue,
    pub artists: Vec<Artist>,
    pub tiers: Vec<TicketTier>,
    pub featured: bool,
    pub category: EventCategory,
    pub duration: String,
}

/// Event details copied onto a booking so it can still be displayed after
/// the event is edited or cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub title: String,
    pub starts_at: OffsetDateTime,
    pub venue_name: String,
}
