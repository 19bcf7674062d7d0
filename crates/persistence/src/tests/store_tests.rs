// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The validation engine running against the `SQLite` store.

use mi3ad::{BookingStore, Outcome, StoreError, ValidationEngine};
use mi3ad_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use mi3ad_domain::{BookingId, BookingStatus};

use crate::Persistence;
use crate::tests::{create_seeded_persistence, create_test_cause};

fn create_gate(device: &str) -> ValidationEngine {
    ValidationEngine::new(Actor::new(device.to_string(), String::from("gatekeeper")))
}

#[test]
fn test_find_by_scan_code_is_exact() {
    let mut persistence: Persistence = create_seeded_persistence();

    assert!(persistence.find_by_scan_code("QR-001").unwrap().is_some());
    assert!(persistence.find_by_scan_code("qr-001").unwrap().is_none());
    assert!(persistence.find_by_scan_code("QR-00").unwrap().is_none());
}

#[test]
fn test_set_status_on_missing_booking_is_not_found() {
    let mut persistence: Persistence = create_seeded_persistence();
    let event: AuditEvent = AuditEvent::new(
        BookingId::new("ghost"),
        Actor::new(String::from("gate-1"), String::from("gatekeeper")),
        create_test_cause(),
        Action::new(String::from("Admit"), None),
        StateSnapshot::absent(),
        StateSnapshot::absent(),
    );

    let result = persistence.set_status(
        &BookingId::new("ghost"),
        BookingStatus::Confirmed,
        BookingStatus::Used,
        &event,
    );

    assert_eq!(
        result,
        Err(StoreError::NotFound {
            booking_id: BookingId::new("ghost")
        })
    );
}

#[test]
fn test_admission_through_engine_persists_used_status_and_audit() {
    let mut persistence: Persistence = create_seeded_persistence();
    let mut gate: ValidationEngine = create_gate("gate-1");

    let evaluated: Outcome = gate.evaluate(&mut persistence, "QR-001").unwrap();
    assert!(matches!(evaluated, Outcome::Admissible(_)));

    let confirmed: Outcome = gate
        .confirm(
            &mut persistence,
            &BookingId::new("b1"),
            Cause::new(String::from("scan-1"), String::from("Entry confirmed")),
        )
        .unwrap();
    assert!(confirmed.is_admitted());

    assert_eq!(
        persistence.get_booking(&BookingId::new("b1")).unwrap().status(),
        BookingStatus::Used
    );
    let timeline: Vec<AuditEvent> = persistence
        .get_booking_audit_timeline(&BookingId::new("b1"))
        .unwrap();
    let names: Vec<&str> = timeline.iter().map(|e| e.action.name.as_str()).collect();
    assert_eq!(names, vec!["RegisterBooking", "Admit"]);
    assert_eq!(timeline[1].actor.id, "gate-1");
    assert_eq!(timeline[1].cause.id, "scan-1");
}

#[test]
fn test_two_devices_cannot_admit_the_same_booking() {
    let mut persistence: Persistence = create_seeded_persistence();
    let mut gate_a: ValidationEngine = create_gate("gate-a");
    let mut gate_b: ValidationEngine = create_gate("gate-b");

    let a: Outcome = gate_a.evaluate(&mut persistence, "QR-001").unwrap();
    let b: Outcome = gate_b.evaluate(&mut persistence, "QR-001").unwrap();
    assert!(matches!(a, Outcome::Admissible(_)));
    assert!(matches!(b, Outcome::Admissible(_)));

    let first: Outcome = gate_a
        .confirm(&mut persistence, &BookingId::new("b1"), create_test_cause())
        .unwrap();
    let second: Outcome = gate_b
        .confirm(&mut persistence, &BookingId::new("b1"), create_test_cause())
        .unwrap();

    assert!(first.is_admitted());
    assert_eq!(
        second,
        Outcome::AlreadyUsed {
            booking_id: BookingId::new("b1")
        }
    );

    let admits: usize = persistence
        .get_booking_audit_timeline(&BookingId::new("b1"))
        .unwrap()
        .iter()
        .filter(|e| e.action.name == "Admit")
        .count();
    assert_eq!(admits, 1);
}

#[test]
fn test_discard_after_admissible_leaves_database_untouched() {
    let mut persistence: Persistence = create_seeded_persistence();
    let mut gate: ValidationEngine = create_gate("gate-1");

    gate.evaluate(&mut persistence, "QR-002").unwrap();
    gate.discard();
    gate.discard();

    assert_eq!(
        persistence.get_booking(&BookingId::new("b2")).unwrap().status(),
        BookingStatus::Confirmed
    );
    assert_eq!(
        persistence
            .get_booking_audit_timeline(&BookingId::new("b2"))
            .unwrap()
            .len(),
        1
    );
}
