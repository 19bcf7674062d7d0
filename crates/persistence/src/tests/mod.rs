// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;
mod store_tests;

use mi3ad::{BookingRegistration, RegistrationResult, apply_registration};
use mi3ad_audit::{Actor, Cause};
use mi3ad_domain::{BookingId, EventId, Price, ScanCode};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::Persistence;

pub const BOOKED_AT: OffsetDateTime = datetime!(2026-03-01 18:30:15.25 +02:00);

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("test-actor"), String::from("admin"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn create_test_registration(
    booking_id: &str,
    event_id: &str,
    scan_code: &str,
    ticket_count: u32,
    total_price: Price,
) -> RegistrationResult {
    apply_registration(
        BookingRegistration {
            booking_id: BookingId::new(booking_id),
            event_id: EventId::new(event_id),
            scan_code: ScanCode::new(scan_code),
            ticket_count,
            total_price,
            booked_at: BOOKED_AT,
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap()
}

/// Opens an in-memory database holding `b1`/`QR-001` (2 tickets, free)
/// and `b2`/`QR-002` (1 ticket, 25 LYD), both confirmed, for event `evt-1`.
pub fn create_seeded_persistence() -> Persistence {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence
        .register_booking(&create_test_registration("b1", "evt-1", "QR-001", 2, Price::FREE))
        .unwrap();
    persistence
        .register_booking(&create_test_registration(
            "b2",
            "evt-1",
            "QR-002",
            1,
            Price::from_dinar(25),
        ))
        .unwrap();
    persistence
}
