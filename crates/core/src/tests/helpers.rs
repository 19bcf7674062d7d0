// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{BookingStore, InMemoryBookingStore, StoreError};
use mi3ad_audit::{Actor, AuditEvent, Cause};
use mi3ad_domain::{
    Booking, BookingId, BookingStatus, EventId, Price, ScanCode, TicketCount,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub const BOOKED_AT: OffsetDateTime = datetime!(2026-03-01 18:30 UTC);

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("gate-1"), String::from("gatekeeper"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Entry confirmed"))
}

pub fn create_test_booking(
    id: &str,
    scan_code: &str,
    status: BookingStatus,
    ticket_count: u32,
    total_price: Price,
) -> Booking {
    Booking::new(
        BookingId::new(id),
        EventId::new("evt-1"),
        ScanCode::new(scan_code),
        status,
        TicketCount::new(ticket_count).unwrap(),
        total_price,
        BOOKED_AT,
    )
}

pub fn create_seeded_store(bookings: Vec<Booking>) -> InMemoryBookingStore {
    let mut store: InMemoryBookingStore = InMemoryBookingStore::new();
    for booking in bookings {
        store.insert(booking).unwrap();
    }
    store
}

/// Wraps an in-memory store with failure injection and call counting.
#[derive(Debug, Default)]
pub struct ScriptedStore {
    pub inner: InMemoryBookingStore,
    pub fail_lookups: bool,
    pub panic_on_lookup: bool,
    pub fail_writes: usize,
    pub race_on_write: Option<BookingStatus>,
    pub lookups: usize,
    pub set_status_calls: usize,
}

impl ScriptedStore {
    pub fn new(inner: InMemoryBookingStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable {
            message: String::from("connection reset"),
        }
    }
}

impl BookingStore for ScriptedStore {
    fn find_by_scan_code(&mut self, scan_code: &str) -> Result<Option<Booking>, StoreError> {
        self.lookups += 1;
        assert!(!self.panic_on_lookup, "lookup aborted");
        if self.fail_lookups {
            return Err(Self::unavailable());
        }
        self.inner.find_by_scan_code(scan_code)
    }

    fn find_by_id(&mut self, booking_id: &BookingId) -> Result<Option<Booking>, StoreError> {
        self.inner.find_by_id(booking_id)
    }

    fn set_status(
        &mut self,
        booking_id: &BookingId,
        expected: BookingStatus,
        new_status: BookingStatus,
        audit_event: &AuditEvent,
    ) -> Result<(), StoreError> {
        self.set_status_calls += 1;
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(Self::unavailable());
        }
        if let Some(raced) = self.race_on_write.take() {
            self.inner
                .set_status(booking_id, BookingStatus::Confirmed, raced, audit_event)?;
        }
        self.inner
            .set_status(booking_id, expected, new_status, audit_event)
    }
}
