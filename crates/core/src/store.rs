// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The booking store seam.
//!
//! The validation engine never owns its store. Each call receives the
//! store by mutable reference, so one process may run many engines over a
//! single shared store, and tests may substitute a failing one.

use mi3ad_audit::AuditEvent;
use mi3ad_domain::{Booking, BookingId, BookingStatus};
use thiserror::Error;

/// Errors reported by a booking store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The booking does not exist.
    #[error("Booking '{booking_id}' not found")]
    NotFound {
        /// The booking that was looked up.
        booking_id: BookingId,
    },
    /// A conditional status change found a different current status.
    #[error("Booking '{booking_id}' is {actual}, expected {expected}")]
    StatusConflict {
        /// The booking being changed.
        booking_id: BookingId,
        /// The status the caller expected.
        expected: BookingStatus,
        /// The status actually stored.
        actual: BookingStatus,
    },
    /// The scan code is already assigned to another booking.
    #[error("Scan code '{scan_code}' is already assigned to a booking")]
    DuplicateScanCode {
        /// The conflicting scan code.
        scan_code: String,
    },
    /// A booking with this id already exists.
    #[error("Booking '{booking_id}' already exists")]
    DuplicateBooking {
        /// The conflicting booking.
        booking_id: BookingId,
    },
    /// The store could not be reached or failed internally.
    #[error("Booking store unavailable: {message}")]
    Unavailable {
        /// Backend-specific detail.
        message: String,
    },
}

/// Read and conditional-write access to bookings.
pub trait BookingStore {
    /// Looks up a booking by the exact scan code.
    ///
    /// Matching is case-sensitive and unnormalized.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the lookup could not be performed.
    fn find_by_scan_code(&mut self, scan_code: &str) -> Result<Option<Booking>, StoreError>;

    /// Looks up a booking by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the lookup could not be performed.
    fn find_by_id(&mut self, booking_id: &BookingId) -> Result<Option<Booking>, StoreError>;

    /// Changes a booking's status if, and only if, it is currently `expected`.
    ///
    /// The audit event is recorded atomically with the change.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the booking does not exist
    /// - `StoreError::StatusConflict` if the current status is not `expected`
    /// - `StoreError::Unavailable` if the write could not be performed
    fn set_status(
        &mut self,
        booking_id: &BookingId,
        expected: BookingStatus,
        new_status: BookingStatus,
        audit_event: &AuditEvent,
    ) -> Result<(), StoreError>;
}
