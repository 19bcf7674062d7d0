// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions.
//!
//! Booking management runs against `Persistence` directly. Gate operations
//! drive a device's `ValidationEngine` over any `BookingStore`.

use mi3ad::{
    Admission, BookingRegistration, BookingStore, Command, EngineState, Outcome,
    RegistrationResult, TransitionResult, ValidationEngine, apply, apply_registration,
};
use mi3ad_audit::{Actor, AuditEvent, Cause};
use mi3ad_domain::{Booking, BookingId, EventId, Price, ScanCode};
use mi3ad_persistence::Persistence;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::request_response::{
    AdmissionInfo, AuditEventInfo, AuditTimelineResponse, CancelBookingRequest,
    CancelBookingResponse, ConfirmRequest, DiscardResponse, ListBookingsResponse,
    OutcomeMessage, RegisterBookingRequest, RegisterBookingResponse, ScanRequest, ScanResponse,
    ScannerStateResponse, TicketInfo,
};

/// Prefix of generated scan codes.
const GENERATED_SCAN_CODE_PREFIX: &str = "QR-";

/// Generates a scan code for a booking registered without one.
#[must_use]
pub fn generate_scan_code() -> String {
    format!("{GENERATED_SCAN_CODE_PREFIX}{:016X}", rand::random::<u64>())
}

/// Builds the text a holder shares for their ticket.
#[must_use]
pub fn share_message(booking: &Booking) -> String {
    format!(
        "My ticket for event {}\nTicket code: {}",
        booking.event_id(),
        booking.scan_code()
    )
}

fn ticket_info(booking: &Booking) -> Result<TicketInfo, ApiError> {
    let booked_at: String = booking
        .booked_at()
        .format(&Rfc3339)
        .map_err(|e| ApiError::Internal {
            message: format!("Cannot format booking date of '{}': {e}", booking.id()),
        })?;

    Ok(TicketInfo {
        booking_id: booking.id().to_string(),
        event_id: booking.event_id().to_string(),
        scan_code: booking.scan_code().to_string(),
        status: booking.status().as_str().to_string(),
        status_label: booking.status().label().to_string(),
        ticket_count: booking.ticket_count().get(),
        total_price_minor: booking.total_price().minor_units(),
        price_label: booking.total_price().to_string(),
        booked_at,
        share_message: share_message(booking),
    })
}

fn audit_event_info(event: &AuditEvent) -> AuditEventInfo {
    AuditEventInfo {
        event_id: event.event_id,
        actor_id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
        cause_id: event.cause.id.clone(),
        action: event.action.name.clone(),
        details: event.action.details.clone(),
        before: event.before.data.clone(),
        after: event.after.data.clone(),
    }
}

fn parse_booking_id(raw: &str) -> Result<BookingId, ApiError> {
    if raw.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("booking_id"),
            message: String::from("Booking id cannot be empty"),
        });
    }
    Ok(BookingId::new(raw))
}

/// Registers a confirmed booking so it can be presented at the gate.
///
/// A scan code is generated when the request carries none. The booking
/// date is the time of registration.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not authorized
/// - A field is invalid
/// - The booking id or scan code is already taken
/// - Persistence fails
pub fn register_booking(
    persistence: &mut Persistence,
    request: RegisterBookingRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RegisterBookingResponse, ApiError> {
    // Enforce authorization before executing command
    AuthorizationService::authorize_register_booking(authenticated_actor)?;

    let actor: Actor = authenticated_actor.to_audit_actor();

    let scan_code: String = request.scan_code.unwrap_or_else(generate_scan_code);

    let registration: BookingRegistration = BookingRegistration {
        booking_id: BookingId::new(&request.booking_id),
        event_id: EventId::new(&request.event_id),
        scan_code: ScanCode::new(&scan_code),
        ticket_count: request.ticket_count,
        total_price: Price::from_minor_units(request.total_price_minor),
        booked_at: OffsetDateTime::now_utc(),
    };

    let result: RegistrationResult =
        apply_registration(registration, actor, cause).map_err(translate_core_error)?;

    let event_id: i64 = persistence
        .register_booking(&result)
        .map_err(translate_persistence_error)?;

    info!(
        booking_id = %result.booking.id(),
        event = %result.booking.event_id(),
        audit_event_id = event_id,
        "Registered booking"
    );

    Ok(RegisterBookingResponse {
        event_id,
        ticket: ticket_info(&result.booking)?,
        message: format!("Booking '{}' registered", result.booking.id()),
    })
}

/// Cancels a booking that has not been used.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not authorized
/// - The booking does not exist
/// - The booking is already used or cancelled
/// - The booking changed while the cancellation was being written
pub fn cancel_booking(
    persistence: &mut Persistence,
    request: CancelBookingRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CancelBookingResponse, ApiError> {
    // Enforce authorization before executing command
    AuthorizationService::authorize_cancel_booking(authenticated_actor)?;

    let booking_id: BookingId = parse_booking_id(&request.booking_id)?;

    if request.reason.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("reason"),
            message: String::from("Cancellation reason cannot be empty"),
        });
    }

    let booking: Booking = persistence
        .get_booking(&booking_id)
        .map_err(translate_persistence_error)?;

    let actor: Actor = authenticated_actor.to_audit_actor();
    let command: Command = Command::Cancel {
        reason: request.reason,
    };

    let result: TransitionResult =
        apply(&booking, command, actor, cause).map_err(translate_core_error)?;

    // The write is conditional on the status read above
    let event_id: i64 = persistence
        .persist_transition(booking.status(), &result)
        .map_err(translate_persistence_error)?;

    info!(booking_id = %booking_id, audit_event_id = event_id, "Cancelled booking");

    Ok(CancelBookingResponse {
        event_id,
        booking_id: booking_id.to_string(),
        message: format!("Booking '{booking_id}' cancelled"),
    })
}

/// Returns a ticket's details.
///
/// # Errors
///
/// Returns an error if the booking does not exist or cannot be read.
pub fn get_ticket(persistence: &mut Persistence, booking_id: &str) -> Result<TicketInfo, ApiError> {
    let booking_id: BookingId = parse_booking_id(booking_id)?;

    let booking: Booking = persistence
        .get_booking(&booking_id)
        .map_err(translate_persistence_error)?;

    ticket_info(&booking)
}

/// Lists tickets, optionally restricted to one event.
///
/// # Errors
///
/// Returns an error if the event filter is blank or the query fails.
pub fn list_bookings(
    persistence: &mut Persistence,
    event_id: Option<&str>,
) -> Result<ListBookingsResponse, ApiError> {
    let filter: Option<EventId> = match event_id {
        Some(raw) if raw.trim().is_empty() => {
            return Err(ApiError::InvalidInput {
                field: String::from("event_id"),
                message: String::from("Event id filter cannot be empty"),
            });
        }
        Some(raw) => Some(EventId::new(raw)),
        None => None,
    };

    let bookings: Vec<Booking> = persistence
        .list_bookings(filter.as_ref())
        .map_err(translate_persistence_error)?;

    Ok(ListBookingsResponse {
        event_id: filter.map(|e| e.to_string()),
        tickets: bookings
            .iter()
            .map(ticket_info)
            .collect::<Result<Vec<TicketInfo>, ApiError>>()?,
    })
}

/// Returns the audit history of a booking, oldest first.
///
/// # Errors
///
/// Returns an error if the actor is not authorized, the booking does not
/// exist, or the query fails.
pub fn get_booking_audit_timeline(
    persistence: &mut Persistence,
    booking_id: &str,
    authenticated_actor: &AuthenticatedActor,
) -> Result<AuditTimelineResponse, ApiError> {
    AuthorizationService::authorize_read_audit(authenticated_actor)?;

    let booking_id: BookingId = parse_booking_id(booking_id)?;

    // Unknown bookings are a 404, not an empty history
    persistence
        .get_booking(&booking_id)
        .map_err(translate_persistence_error)?;

    let events: Vec<AuditEvent> = persistence
        .get_booking_audit_timeline(&booking_id)
        .map_err(translate_persistence_error)?;

    Ok(AuditTimelineResponse {
        booking_id: booking_id.to_string(),
        events: events.iter().map(audit_event_info).collect(),
    })
}

/// Evaluates a scanned payload on a device's engine.
///
/// Business outcomes (invalid, used, cancelled, ...) are returned in the
/// response, not as errors.
///
/// # Errors
///
/// Returns an error if the actor is not authorized, or if the engine is
/// busy with a pending admission.
pub fn scan_ticket<S>(
    engine: &mut ValidationEngine,
    store: &mut S,
    request: &ScanRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ScanResponse, ApiError>
where
    S: BookingStore + ?Sized,
{
    AuthorizationService::authorize_scan(authenticated_actor)?;

    engine.set_actor(authenticated_actor.to_audit_actor());

    let outcome: Outcome = engine
        .evaluate(store, &request.payload)
        .map_err(translate_core_error)?;

    if let Outcome::LookupFailed { reason } = &outcome {
        warn!(actor = %authenticated_actor.id, reason = %reason, "Ticket lookup failed");
    }

    Ok(scan_response(engine, &outcome))
}

/// Confirms the admission pending on a device's engine.
///
/// # Errors
///
/// Returns an error if the actor is not authorized, nothing is pending, or
/// the request names a booking other than the pending one.
pub fn confirm_admission<S>(
    engine: &mut ValidationEngine,
    store: &mut S,
    request: &ConfirmRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ScanResponse, ApiError>
where
    S: BookingStore + ?Sized,
{
    AuthorizationService::authorize_confirm(authenticated_actor)?;

    // The admission is credited to whoever confirms it
    engine.set_actor(authenticated_actor.to_audit_actor());

    let booking_id: BookingId = parse_booking_id(&request.booking_id)?;

    let outcome: Outcome = engine
        .confirm(store, &booking_id, cause)
        .map_err(translate_core_error)?;

    match &outcome {
        Outcome::Admitted(admission) => info!(
            booking_id = %admission.booking_id,
            tickets = admission.ticket_count.get(),
            actor = %authenticated_actor.id,
            "Admission confirmed"
        ),
        Outcome::UpdateFailed { reason, .. } => {
            warn!(booking_id = %booking_id, reason = %reason, "Admission could not be recorded");
        }
        _ => {}
    }

    Ok(scan_response(engine, &outcome))
}

/// Abandons the admission pending on a device's engine, if any.
///
/// # Errors
///
/// Returns an error if the actor is not authorized.
pub fn discard_scan(
    engine: &mut ValidationEngine,
    authenticated_actor: &AuthenticatedActor,
) -> Result<DiscardResponse, ApiError> {
    AuthorizationService::authorize_discard(authenticated_actor)?;

    Ok(DiscardResponse {
        discarded_booking_id: engine.discard().map(|id| id.to_string()),
    })
}

/// Describes a device engine's current state.
#[must_use]
pub fn scanner_state(engine: &ValidationEngine) -> ScannerStateResponse {
    let state: &str = match engine.state() {
        EngineState::Idle => "idle",
        EngineState::Evaluating => "evaluating",
        EngineState::AwaitingConfirmation { .. } => "awaiting_confirmation",
    };
    ScannerStateResponse {
        state: String::from(state),
        pending_booking_id: engine.pending().map(|b| b.id().to_string()),
    }
}

fn admission_info(admission: &Admission) -> AdmissionInfo {
    AdmissionInfo {
        booking_id: admission.booking_id.to_string(),
        event_id: admission.event_id.to_string(),
        ticket_count: admission.ticket_count.get(),
        total_price_minor: admission.total_price.minor_units(),
        price_label: admission.total_price.to_string(),
    }
}

/// Returns the operator-facing text for an outcome.
#[must_use]
pub fn outcome_message(outcome: &Outcome) -> OutcomeMessage {
    let (title, body): (&str, String) = match outcome {
        Outcome::Admissible(admission) => (
            "Valid ticket",
            format!(
                "Valid ticket!\nTickets: {}\nPrice: {}",
                admission.ticket_count.get(),
                admission.total_price
            ),
        ),
        Outcome::Admitted(_) => (
            "Entry confirmed",
            String::from("The guest has been admitted"),
        ),
        Outcome::Invalid => (
            "Invalid ticket",
            String::from("The QR code is incorrect or the ticket does not exist"),
        ),
        Outcome::AlreadyUsed { .. } => (
            "Ticket already used",
            String::from("This ticket has already been used"),
        ),
        Outcome::Cancelled { .. } => (
            "Ticket cancelled",
            String::from("This ticket has been cancelled"),
        ),
        Outcome::UpdateFailed { .. } => (
            "Entry failed",
            String::from("The admission could not be recorded; retry or discard"),
        ),
        Outcome::LookupFailed { .. } => (
            "Scan error",
            String::from("An error occurred while processing the ticket"),
        ),
    };
    OutcomeMessage {
        title: String::from(title),
        body,
    }
}

fn scan_response(engine: &ValidationEngine, outcome: &Outcome) -> ScanResponse {
    let (booking_id, admission): (Option<String>, Option<AdmissionInfo>) = match outcome {
        Outcome::Admissible(admission) | Outcome::Admitted(admission) => (
            Some(admission.booking_id.to_string()),
            Some(admission_info(admission)),
        ),
        Outcome::AlreadyUsed { booking_id }
        | Outcome::Cancelled { booking_id }
        | Outcome::UpdateFailed { booking_id, .. } => (Some(booking_id.to_string()), None),
        Outcome::Invalid | Outcome::LookupFailed { .. } => (None, None),
    };

    ScanResponse {
        outcome: String::from(outcome.name()),
        booking_id,
        admission,
        message: outcome_message(outcome),
        awaiting_confirmation: engine.pending().is_some(),
    }
}
