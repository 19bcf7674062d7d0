// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking management handler tests.

use mi3ad_domain::{BookingId, BookingStatus};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::{
    ApiError, CancelBookingRequest, cancel_booking, get_booking_audit_timeline, get_ticket,
    list_bookings, register_booking,
};

use super::helpers::{
    booking_request, create_test_admin, create_test_cause, setup_test_persistence,
};

#[test]
fn test_register_booking_returns_ticket() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let response = register_booking(
        &mut persistence,
        booking_request("b3", Some("QR-003"), 4, 12_500),
        &create_test_admin(),
        create_test_cause(),
    )
    .expect("Registration failed");

    assert!(response.event_id > 0);
    assert_eq!(response.ticket.booking_id, "b3");
    assert_eq!(response.ticket.status, "confirmed");
    assert_eq!(response.ticket.status_label, "Confirmed");
    assert_eq!(response.ticket.ticket_count, 4);
    assert_eq!(response.ticket.price_label, "12.500 LYD");

    let booked_at = OffsetDateTime::parse(&response.ticket.booked_at, &Rfc3339)
        .expect("Booking date is not RFC 3339");
    assert!(booked_at <= OffsetDateTime::now_utc());

    let ticket = get_ticket(&mut persistence, "b3").expect("Ticket lookup failed");
    assert_eq!(ticket.booked_at, response.ticket.booked_at);
}

#[test]
fn test_register_booking_generates_scan_code() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let response = register_booking(
        &mut persistence,
        booking_request("b3", None, 1, 0),
        &create_test_admin(),
        create_test_cause(),
    )
    .expect("Registration failed");

    let code = &response.ticket.scan_code;
    assert!(code.starts_with("QR-"));
    assert_eq!(code.len(), 19);
    assert!(code[3..].chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_register_booking_rejects_duplicate_scan_code() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let result = register_booking(
        &mut persistence,
        booking_request("b3", Some("QR-001"), 1, 0),
        &create_test_admin(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_register_booking_rejects_duplicate_id() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let result = register_booking(
        &mut persistence,
        booking_request("b1", Some("QR-777"), 1, 0),
        &create_test_admin(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_register_booking_rejects_zero_tickets() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let result = register_booking(
        &mut persistence,
        booking_request("b3", Some("QR-003"), 0, 0),
        &create_test_admin(),
        create_test_cause(),
    );

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "ticket_count"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_register_booking_rejects_price_over_limit() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let result = register_booking(
        &mut persistence,
        booking_request("b3", Some("QR-003"), 1, u64::MAX),
        &create_test_admin(),
        create_test_cause(),
    );

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "total_price_minor"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
    assert!(get_ticket(&mut persistence, "b3").is_err());
}

#[test]
fn test_register_booking_rejects_padded_scan_code() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let result = register_booking(
        &mut persistence,
        booking_request("b3", Some(" QR-003"), 1, 0),
        &create_test_admin(),
        create_test_cause(),
    );

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "scan_code"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_get_ticket_builds_share_message() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let ticket = get_ticket(&mut persistence, "b2").expect("Ticket not found");

    assert_eq!(ticket.price_label, "25 LYD");
    assert_eq!(
        ticket.share_message,
        "My ticket for event evt-1\nTicket code: QR-002"
    );
}

#[test]
fn test_get_ticket_free_price_label() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let ticket = get_ticket(&mut persistence, "b1").expect("Ticket not found");

    assert_eq!(ticket.price_label, "Free");
}

#[test]
fn test_get_ticket_unknown_booking() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let result = get_ticket(&mut persistence, "nope");

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_get_ticket_empty_id() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    assert!(matches!(
        get_ticket(&mut persistence, ""),
        Err(ApiError::InvalidInput { .. })
    ));
}

#[test]
fn test_list_bookings_filters_by_event() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");
    let mut other = booking_request("b3", Some("QR-003"), 1, 0);
    other.event_id = String::from("evt-2");
    register_booking(
        &mut persistence,
        other,
        &create_test_admin(),
        create_test_cause(),
    )
    .expect("Registration failed");

    let all = list_bookings(&mut persistence, None).expect("List failed");
    let evt1 = list_bookings(&mut persistence, Some("evt-1")).expect("List failed");

    assert_eq!(all.tickets.len(), 3);
    assert_eq!(evt1.tickets.len(), 2);
    assert_eq!(evt1.event_id.as_deref(), Some("evt-1"));
}

#[test]
fn test_list_bookings_rejects_blank_filter() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    assert!(matches!(
        list_bookings(&mut persistence, Some(" ")),
        Err(ApiError::InvalidInput { .. })
    ));
}

#[test]
fn test_cancel_booking_marks_cancelled() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let response = cancel_booking(
        &mut persistence,
        CancelBookingRequest {
            booking_id: String::from("b1"),
            reason: String::from("Event moved"),
        },
        &create_test_admin(),
        create_test_cause(),
    )
    .expect("Cancellation failed");

    assert_eq!(response.booking_id, "b1");
    let booking = persistence
        .get_booking(&BookingId::new("b1"))
        .expect("Booking not found");
    assert_eq!(booking.status(), BookingStatus::Cancelled);
}

#[test]
fn test_cancel_booking_twice_is_rule_violation() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");
    let request = CancelBookingRequest {
        booking_id: String::from("b1"),
        reason: String::from("Event moved"),
    };

    cancel_booking(
        &mut persistence,
        request.clone(),
        &create_test_admin(),
        create_test_cause(),
    )
    .expect("First cancellation failed");
    let second = cancel_booking(
        &mut persistence,
        request,
        &create_test_admin(),
        create_test_cause(),
    );

    match second {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "booking_lifecycle"),
        other => panic!("Expected DomainRuleViolation, got {other:?}"),
    }
}

#[test]
fn test_cancel_booking_requires_reason() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let result = cancel_booking(
        &mut persistence,
        CancelBookingRequest {
            booking_id: String::from("b1"),
            reason: String::new(),
        },
        &create_test_admin(),
        create_test_cause(),
    );

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "reason"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_cancel_unknown_booking() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let result = cancel_booking(
        &mut persistence,
        CancelBookingRequest {
            booking_id: String::from("missing"),
            reason: String::from("Refunded"),
        },
        &create_test_admin(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_audit_timeline_records_registration_and_cancellation() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");
    cancel_booking(
        &mut persistence,
        CancelBookingRequest {
            booking_id: String::from("b2"),
            reason: String::from("Refunded"),
        },
        &create_test_admin(),
        create_test_cause(),
    )
    .expect("Cancellation failed");

    let timeline = get_booking_audit_timeline(&mut persistence, "b2", &create_test_admin())
        .expect("Timeline failed");

    let actions: Vec<&str> = timeline.events.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["RegisterBooking", "CancelBooking"]);
    assert_eq!(timeline.events[1].details.as_deref(), Some("Refunded"));
    assert_eq!(timeline.events[1].actor_type, "admin");
    assert_eq!(timeline.events[1].after, "booking=b2,status=cancelled");
}

#[test]
fn test_audit_timeline_unknown_booking() {
    let mut persistence = setup_test_persistence().expect("Failed to setup test persistence");

    let result = get_booking_audit_timeline(&mut persistence, "missing", &create_test_admin());

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}
