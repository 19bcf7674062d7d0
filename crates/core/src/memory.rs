// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashMap;

use mi3ad_audit::AuditEvent;
use mi3ad_domain::{Booking, BookingId, BookingStatus, ScanCode};

use crate::state::RegistrationResult;
use crate::store::{BookingStore, StoreError};

/// A booking store held entirely in memory.
///
/// Used by tests and by single-device deployments that seed bookings at
/// startup. Audit events are kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingStore {
    bookings: HashMap<BookingId, Booking>,
    scan_index: HashMap<ScanCode, BookingId>,
    audit_log: Vec<AuditEvent>,
}

impl InMemoryBookingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a booking as-is, without an audit event.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateBooking` or `StoreError::DuplicateScanCode`
    /// if either key is already taken.
    pub fn insert(&mut self, booking: Booking) -> Result<(), StoreError> {
        if self.bookings.contains_key(booking.id()) {
            return Err(StoreError::DuplicateBooking {
                booking_id: booking.id().clone(),
            });
        }
        if self.scan_index.contains_key(booking.scan_code()) {
            return Err(StoreError::DuplicateScanCode {
                scan_code: booking.scan_code().to_string(),
            });
        }

        self.scan_index
            .insert(booking.scan_code().clone(), booking.id().clone());
        self.bookings.insert(booking.id().clone(), booking);
        Ok(())
    }

    /// Stores a registered booking together with its audit event.
    ///
    /// Returns the event id assigned to the audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking id or scan code is already taken.
    pub fn register(&mut self, registration: &RegistrationResult) -> Result<i64, StoreError> {
        self.insert(registration.booking.clone())?;
        Ok(self.record(&registration.audit_event))
    }

    /// Returns a booking by id.
    #[must_use]
    pub fn get(&self, booking_id: &BookingId) -> Option<&Booking> {
        self.bookings.get(booking_id)
    }

    /// Returns the number of stored bookings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    /// Returns true if the store holds no bookings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Returns all recorded audit events, oldest first.
    #[must_use]
    pub fn audit_log(&self) -> &[AuditEvent] {
        &self.audit_log
    }

    fn record(&mut self, event: &AuditEvent) -> i64 {
        let event_id: i64 = i64::try_from(self.audit_log.len()).map_or(i64::MAX, |n| n + 1);
        let mut stored: AuditEvent = event.clone();
        stored.event_id = Some(event_id);
        self.audit_log.push(stored);
        event_id
    }
}

impl BookingStore for InMemoryBookingStore {
    fn find_by_scan_code(&mut self, scan_code: &str) -> Result<Option<Booking>, StoreError> {
        let key: ScanCode = ScanCode::new(scan_code);
        Ok(self
            .scan_index
            .get(&key)
            .and_then(|id| self.bookings.get(id))
            .cloned())
    }

    fn find_by_id(&mut self, booking_id: &BookingId) -> Result<Option<Booking>, StoreError> {
        Ok(self.bookings.get(booking_id).cloned())
    }

    fn set_status(
        &mut self,
        booking_id: &BookingId,
        expected: BookingStatus,
        new_status: BookingStatus,
        audit_event: &AuditEvent,
    ) -> Result<(), StoreError> {
        let Some(booking) = self.bookings.get_mut(booking_id) else {
            return Err(StoreError::NotFound {
                booking_id: booking_id.clone(),
            });
        };

        if booking.status() != expected {
            return Err(StoreError::StatusConflict {
                booking_id: booking_id.clone(),
                expected,
                actual: booking.status(),
            });
        }

        *booking = booking.with_status(new_status);
        self.record(audit_event);
        Ok(())
    }
}
