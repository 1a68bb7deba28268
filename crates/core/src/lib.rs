// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod booking_id;
mod command;
mod error;
mod proof;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply, plan_booking};
pub use booking_id::generate_booking_id;
pub use command::Command;
pub use error::CoreError;
pub use proof::{PROOF_IMAGE_PREFIX, PROOF_IMAGE_SIZE, ProofPayload, generate_proof, verify_proof};
pub use state::{BookingRequest, BookingTransition, HistoryEntry};
