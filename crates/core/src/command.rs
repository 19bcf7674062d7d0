// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// A command represents operator or system intent as data only.
///
/// Commands are the only way to request a booking status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Admit the holder of a confirmed booking, consuming it.
    Admit,
    /// Cancel a confirmed booking.
    Cancel {
        /// Why the booking is being cancelled.
        reason: String,
    },
}

impl Command {
    /// Returns the audit action name for this command.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::Admit => "Admit",
            Self::Cancel { .. } => "CancelBooking",
        }
    }
}
