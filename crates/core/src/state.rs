// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use mi3ad_audit::AuditEvent;
use mi3ad_domain::{Booking, BookingId, EventId, Price, ScanCode};
use time::OffsetDateTime;

/// The result of a successful booking status transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The booking after the transition.
    pub new_booking: Booking,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// Input for creating a new booking.
///
/// Reservation itself happens elsewhere; this is how a confirmed booking
/// is handed to the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRegistration {
    /// The booking identifier.
    pub booking_id: BookingId,
    /// The event the booking admits to.
    pub event_id: EventId,
    /// The scan code printed on the ticket.
    pub scan_code: ScanCode,
    /// Number of admissions, unchecked.
    pub ticket_count: u32,
    /// Total price paid.
    pub total_price: Price,
    /// When the reservation was made.
    pub booked_at: OffsetDateTime,
}

/// The result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationResult {
    /// The newly created booking, always `confirmed`.
    pub booking: Booking,
    /// The audit event recording the registration.
    pub audit_event: AuditEvent,
}
