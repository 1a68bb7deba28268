// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Proof-of-purchase generation and verification.
//!
//! The payload is canonical JSON with a fixed key order:
//! `bookingId, eventId, tierLabel, quantity, totalPrice, issuedAt`.
//! It is rendered as an SVG QR code and returned as a base64 `data:` URI.

use crate::error::CoreError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use marquee_domain::{Booking, BookingId, ProofOfPurchase, TierLabel};
use qrcode::QrCode;
use qrcode::render::svg;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

/// Minimum edge length of the rendered QR code, in pixels.
pub const PROOF_IMAGE_SIZE: u32 = 200;

/// Prefix of every rendered proof image.
pub const PROOF_IMAGE_PREFIX: &str = "data:image/svg+xml;base64,";

/// The data encoded in a proof-of-purchase.
///
/// Field order is the serialization order and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProofPayload {
    pub booking_id: String,
    pub event_id: i64,
    pub tier_label: TierLabel,
    pub quantity: u32,
    pub total_price: u64,
    /// RFC 3339 UTC instant the booking was made.
    pub issued_at: String,
}

impl ProofPayload {
    /// Builds a payload for a booking about to be created.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EncodingFailure` if `issued_at` cannot be
    /// formatted as RFC 3339.
    pub fn new(
        booking_id: &BookingId,
        event_id: i64,
        tier_label: TierLabel,
        quantity: u32,
        total_price: u64,
        issued_at: OffsetDateTime,
    ) -> Result<Self, CoreError> {
        let issued_at: String = issued_at
            .format(&Rfc3339)
            .map_err(|e| CoreError::EncodingFailure(format!("issuedAt: {e}")))?;
        Ok(Self {
            booking_id: booking_id.to_string(),
            event_id,
            tier_label,
            quantity,
            total_price,
            issued_at,
        })
    }

    /// Re-derives the payload from a stored booking.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EncodingFailure` if the creation timestamp cannot
    /// be formatted.
    pub fn from_booking(booking: &Booking) -> Result<Self, CoreError> {
        Self::new(
            &booking.booking_id,
            booking.event_id,
            booking.tier,
            booking.quantity,
            booking.total_price,
            booking.created_at,
        )
    }

    /// Serializes the payload as canonical JSON.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EncodingFailure` if serialization fails.
    pub fn to_canonical_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(|e| CoreError::EncodingFailure(e.to_string()))
    }
}

/// Encodes a payload and renders it as a scannable proof-of-purchase.
///
/// # Errors
///
/// Returns `CoreError::EncodingFailure` if serialization or QR rendering
/// fails.
pub fn generate_proof(payload: &ProofPayload) -> Result<ProofOfPurchase, CoreError> {
    let json: String = payload.to_canonical_json()?;
    let image: String = render_data_uri(&json)?;
    Ok(ProofOfPurchase {
        payload: json,
        image,
    })
}

fn render_data_uri(json: &str) -> Result<String, CoreError> {
    let code: QrCode = QrCode::new(json.as_bytes())
        .map_err(|e| CoreError::EncodingFailure(format!("QR encoding: {e}")))?;
    let document: String = code
        .render::<svg::Color<'_>>()
        .min_dimensions(PROOF_IMAGE_SIZE, PROOF_IMAGE_SIZE)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .quiet_zone(true)
        .build();
    Ok(format!("{PROOF_IMAGE_PREFIX}{}", STANDARD.encode(document)))
}

/// Checks a presented payload against the one derived from `booking`.
///
/// A payload that does not parse is reported as invalid rather than as an
/// error.
///
/// # Errors
///
/// Returns `CoreError::EncodingFailure` if the expected payload cannot be
/// derived.
pub fn verify_proof(booking: &Booking, presented: &str) -> Result<bool, CoreError> {
    let expected: ProofPayload = ProofPayload::from_booking(booking)?;
    match serde_json::from_str::<ProofPayload>(presented) {
        Ok(payload) => Ok(payload == expected),
        Err(e) => {
            debug!(
                booking_id = %booking.booking_id,
                error = %e,
                "Presented proof payload did not parse"
            );
            Ok(false)
        }
    }
}
