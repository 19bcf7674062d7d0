// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use mi3ad_domain::{BookingId, DomainError};

/// Errors that can occur during state transitions and engine calls.
///
/// Business outcomes (invalid ticket, already used, ...) are not errors;
/// they are reported through `Outcome`. These variants signal misuse of
/// the engine or a violated domain rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// `evaluate` was called while an admission awaits confirmation.
    ConfirmationPending {
        /// The booking awaiting confirmation.
        booking_id: BookingId,
    },
    /// `evaluate` found the engine still `Evaluating`, which only a
    /// panicking store call leaves behind.
    EvaluationInProgress,
    /// `confirm` was called with no admissible booking pending.
    NoPendingAdmission,
    /// `confirm` named a booking other than the pending one.
    BookingMismatch {
        /// The booking awaiting confirmation.
        expected: BookingId,
        /// The booking named by the caller.
        actual: BookingId,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::ConfirmationPending { booking_id } => {
                write!(
                    f,
                    "Booking '{booking_id}' is awaiting confirmation; confirm or discard it first"
                )
            }
            Self::EvaluationInProgress => write!(f, "An evaluation is already in progress"),
            Self::NoPendingAdmission => write!(f, "No admission is awaiting confirmation"),
            Self::BookingMismatch { expected, actual } => {
                write!(
                    f,
                    "Booking '{actual}' does not match the pending admission '{expected}'"
                )
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
