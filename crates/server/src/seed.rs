// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Demo catalog loaded with `--seed`.
//!
//! Start dates are relative to the moment of seeding so the events are
//! always bookable.

use marquee_domain::{
    Artist, DomainError, EventCategory, NewEvent, TicketTier, TierLabel, Venue, validate_new_event,
};
use marquee_persistence::{Persistence, PersistenceError};
use time::{Duration, OffsetDateTime, Time};
use tracing::info;

/// One tier of a demo event: label, price in minor units, total, sold, features.
type TierSeed = (TierLabel, u64, u32, u32, &'static [&'static str]);

struct EventSeed {
    title: &'static str,
    description: &'static str,
    days_ahead: i64,
    venue: (&'static str, &'static str, u32),
    artists: &'static [(&'static str, &'static str)],
    tiers: [TierSeed; 3],
    featured: bool,
    category: EventCategory,
    duration: &'static str,
}

const DEMO_EVENTS: [EventSeed; 4] = [
    EventSeed {
        title: "AR Rahman Live in Chennai",
        description: "The maestro live in concert with his greatest hits and new compositions.",
        days_ahead: 30,
        venue: ("Marina Arena", "Marina Beach Road, Chennai", 20_000),
        artists: &[("AR Rahman", "Classical/Film")],
        tiers: [
            (
                TierLabel::Regular,
                200_000,
                12_000,
                4_000,
                &["General Seating", "Concert Access"],
            ),
            (
                TierLabel::Vip,
                500_000,
                5_000,
                2_000,
                &["Premium Seating", "Meet & Greet", "Exclusive Merchandise"],
            ),
            (
                TierLabel::BackstagePass,
                1_000_000,
                500,
                300,
                &[
                    "Backstage Access",
                    "Photo with Artist",
                    "Signed Merchandise",
                ],
            ),
        ],
        featured: true,
        category: EventCategory::Concert,
        duration: "3 hours",
    },
    EventSeed {
        title: "Coldplay World Tour",
        description: "Stunning visuals, pyrotechnics and two decades of hits.",
        days_ahead: 60,
        venue: ("Wembley Stadium", "Wembley, London", 90_000),
        artists: &[("Coldplay", "Alternative Rock")],
        tiers: [
            (
                TierLabel::Regular,
                150_000,
                60_000,
                15_000,
                &["Stadium Seating", "Concert Access"],
            ),
            (
                TierLabel::Vip,
                350_000,
                20_000,
                5_000,
                &[
                    "Premium Seating",
                    "VIP Lounge Access",
                    "Merchandise Package",
                ],
            ),
            (
                TierLabel::BackstagePass,
                800_000,
                1_000,
                500,
                &["Backstage Access", "Meet & Greet", "Premium Hospitality"],
            ),
        ],
        featured: true,
        category: EventCategory::Concert,
        duration: "2.5 hours",
    },
    EventSeed {
        title: "Sunburn Electronic Festival",
        description: "Top international DJs and a night of dancing under the stars.",
        days_ahead: 90,
        venue: ("Vagator Beach", "Vagator, Goa", 50_000),
        artists: &[("Martin Garrix", "EDM"), ("David Guetta", "EDM")],
        tiers: [
            (
                TierLabel::Regular,
                300_000,
                30_000,
                10_000,
                &["Festival Access", "Food Court Access"],
            ),
            (
                TierLabel::Vip,
                600_000,
                15_000,
                5_000,
                &["VIP Area", "Premium Bar", "Artist Meet Zone"],
            ),
            (
                TierLabel::BackstagePass,
                1_200_000,
                2_000,
                800,
                &[
                    "Backstage Access",
                    "Artist Interaction",
                    "Premium Hospitality",
                ],
            ),
        ],
        featured: false,
        category: EventCategory::Festival,
        duration: "8 hours",
    },
    EventSeed {
        title: "Bollywood Night Live",
        description: "Live performances by top playback singers and dancers.",
        days_ahead: 120,
        venue: ("NSCI Dome", "Worli, Mumbai", 8_000),
        artists: &[
            ("Arijit Singh", "Bollywood"),
            ("Shreya Ghoshal", "Bollywood"),
        ],
        tiers: [
            (
                TierLabel::Regular,
                250_000,
                5_000,
                1_500,
                &["Concert Access", "Souvenir Program"],
            ),
            (
                TierLabel::Vip,
                500_000,
                2_500,
                700,
                &["Premium Seating", "Meet & Greet", "Signed Poster"],
            ),
            (
                TierLabel::BackstagePass,
                1_000_000,
                500,
                200,
                &["Backstage Access", "Photo Session", "VIP Dinner"],
            ),
        ],
        featured: true,
        category: EventCategory::Concert,
        duration: "4 hours",
    },
];

fn build_event(seed: &EventSeed, now: OffsetDateTime) -> Result<NewEvent, DomainError> {
    let tiers: Vec<TicketTier> = seed
        .tiers
        .iter()
        .map(|&(label, price, total, sold, features)| {
            TicketTier::with_sold(label, price, total, sold).map(|tier| {
                tier.with_features(features.iter().map(ToString::to_string).collect())
            })
        })
        .collect::<Result<_, _>>()?;

    let (venue_name, venue_address, capacity) = seed.venue;
    let day: OffsetDateTime = (now + Duration::days(seed.days_ahead)).replace_time(Time::MIDNIGHT);
    let starts_at: OffsetDateTime = day + Duration::hours(19);

    Ok(NewEvent {
        title: seed.title.to_string(),
        description: seed.description.to_string(),
        starts_at,
        venue: Venue {
            name: venue_name.to_string(),
            address: venue_address.to_string(),
            capacity,
        },
        artists: seed
            .artists
            .iter()
            .map(|&(name, genre)| Artist {
                name: name.to_string(),
                genre: Some(genre.to_string()),
            })
            .collect(),
        tiers,
        featured: seed.featured,
        category: seed.category,
        duration: seed.duration.to_string(),
    })
}

/// Loads the demo catalog unless upcoming events already exist.
///
/// # Returns
///
/// The number of events created.
///
/// # Errors
///
/// Returns an error if a demo event fails validation or the store fails.
pub fn seed_demo_events(
    persistence: &mut Persistence,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    if !persistence.list_upcoming_events()?.is_empty() {
        info!("Upcoming events already present; skipping demo catalog");
        return Ok(0);
    }

    for seed in &DEMO_EVENTS {
        let event: NewEvent = build_event(seed, now)?;
        validate_new_event(&event, now)?;
        let event_id: i64 = persistence.create_event(&event, now)?;
        info!(event_id, title = seed.title, "Demo event created");
    }

    Ok(DEMO_EVENTS.len())
}
