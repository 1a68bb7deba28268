// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// A command represents intent to change an existing booking, as data only.
///
/// Commands are the only way to request booking status changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Cancel a confirmed booking and refund its payment.
    Cancel,
    /// Settle a pending simulated payment.
    SettlePayment {
        /// Whether the payment went through.
        succeeded: bool,
    },
    /// Mark a confirmed booking as attended.
    CheckIn,
}

impl Command {
    /// Name recorded in the booking history.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::Cancel => "Cancel",
            Self::SettlePayment { succeeded: true } => "CompletePayment",
            Self::SettlePayment { succeeded: false } => "FailPayment",
            Self::CheckIn => "CheckIn",
        }
    }
}
