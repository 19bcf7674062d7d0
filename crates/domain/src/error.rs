// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Booking identifier is empty or invalid.
    InvalidBookingId(String),
    /// Event identifier is empty or invalid.
    InvalidEventId(String),
    /// Scan code is empty or malformed.
    InvalidScanCode(String),
    /// Ticket count is outside the permitted range.
    InvalidTicketCount {
        /// The rejected count.
        count: u32,
    },
    /// Total price exceeds `MAX_PRICE_MINOR_UNITS`.
    InvalidPrice {
        /// The rejected amount in dirham.
        minor_units: u64,
    },
    /// A status string could not be parsed.
    InvalidBookingStatus {
        /// The unrecognized status string.
        status: String,
    },
    /// A status transition is not permitted by the booking lifecycle.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was rejected.
        reason: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBookingId(msg) => write!(f, "Invalid booking id: {msg}"),
            Self::InvalidEventId(msg) => write!(f, "Invalid event id: {msg}"),
            Self::InvalidScanCode(msg) => write!(f, "Invalid scan code: {msg}"),
            Self::InvalidTicketCount { count } => {
                write!(
                    f,
                    "Invalid ticket count: {count}. Must be between 1 and {}",
                    crate::types::MAX_TICKETS_PER_BOOKING
                )
            }
            Self::InvalidPrice { minor_units } => {
                write!(
                    f,
                    "Invalid price: {minor_units} dirham exceeds the limit of {}",
                    crate::types::MAX_PRICE_MINOR_UNITS
                )
            }
            Self::InvalidBookingStatus { status } => {
                write!(f, "Invalid booking status: '{status}'")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid status transition from '{from}' to '{to}': {reason}"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
