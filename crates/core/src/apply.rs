// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{BookingRegistration, RegistrationResult, TransitionResult};
use mi3ad_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use mi3ad_domain::{Booking, BookingStatus, TicketCount, validate_booking_fields};

/// Applies a command to a booking, producing the new booking and an audit event.
///
/// This function is pure: it does not touch any store. The caller is
/// responsible for persisting the result.
///
/// # Arguments
///
/// * `booking` - The current booking (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if the command's status transition is not permitted
/// from the booking's current status.
pub fn apply(
    booking: &Booking,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let (target, details): (BookingStatus, String) = match &command {
        Command::Admit => (
            BookingStatus::Used,
            format!(
                "Admitted {} ticket(s) for event {}",
                booking.ticket_count().get(),
                booking.event_id()
            ),
        ),
        Command::Cancel { reason } => (BookingStatus::Cancelled, reason.clone()),
    };

    booking.status().validate_transition(target)?;

    let new_booking: Booking = booking.with_status(target);

    let audit_event: AuditEvent = AuditEvent::new(
        booking.id().clone(),
        actor,
        cause,
        Action::new(String::from(command.action_name()), Some(details)),
        StateSnapshot::of_booking(booking),
        StateSnapshot::of_booking(&new_booking),
    );

    Ok(TransitionResult {
        new_booking,
        audit_event,
    })
}

/// Creates a confirmed booking from a registration request.
///
/// Uniqueness of the booking id and scan code is checked by the store
/// that persists the result.
///
/// # Errors
///
/// Returns an error if any field violates the booking field rules.
pub fn apply_registration(
    registration: BookingRegistration,
    actor: Actor,
    cause: Cause,
) -> Result<RegistrationResult, CoreError> {
    let ticket_count: TicketCount = TicketCount::new(registration.ticket_count)?;

    let booking: Booking = Booking::new(
        registration.booking_id,
        registration.event_id,
        registration.scan_code,
        BookingStatus::Confirmed,
        ticket_count,
        registration.total_price,
        registration.booked_at,
    );

    validate_booking_fields(&booking)?;

    let action: Action = Action::new(
        String::from("RegisterBooking"),
        Some(format!(
            "Registered booking {} for event {} ({} ticket(s), {})",
            booking.id(),
            booking.event_id(),
            ticket_count.get(),
            booking.total_price()
        )),
    );

    let audit_event: AuditEvent = AuditEvent::new(
        booking.id().clone(),
        actor,
        cause,
        action,
        StateSnapshot::absent(),
        StateSnapshot::of_booking(&booking),
    );

    Ok(RegistrationResult {
        booking,
        audit_event,
    })
}
