// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use marquee_domain::{BOOKING_ID_PREFIX, BookingId};
use time::OffsetDateTime;

/// Generates a new booking identifier of the form `BK-<unix-millis>-<hex>`.
///
/// The random suffix is 64 bits, rendered as 16 upper-case hex digits.
///
/// # Errors
///
/// Returns an error if the generated identifier fails validation, which
/// only happens for instants outside the supported range.
pub fn generate_booking_id(now: OffsetDateTime) -> Result<BookingId, CoreError> {
    let millis: i128 = now.unix_timestamp_nanos() / 1_000_000;
    let suffix: u64 = rand::random::<u64>();
    BookingId::new(&format!("{BOOKING_ID_PREFIX}{millis}-{suffix:016X}")).map_err(CoreError::from)
}
