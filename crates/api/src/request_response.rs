// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use serde::{Deserialize, Serialize};

/// API request to register a confirmed booking with the gate.
///
/// This DTO is distinct from domain types and represents the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBookingRequest {
    /// The booking identifier.
    pub booking_id: String,
    /// The event the booking admits to.
    pub event_id: String,
    /// The scan code printed on the ticket. Generated when absent.
    pub scan_code: Option<String>,
    /// Number of admissions.
    pub ticket_count: u32,
    /// Total price in dirham.
    pub total_price_minor: u64,
}

/// API response for a successful booking registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBookingResponse {
    /// The audit event ID of the registration.
    pub event_id: i64,
    /// The registered ticket.
    pub ticket: TicketInfo,
    /// A success message.
    pub message: String,
}

/// API request to cancel a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelBookingRequest {
    /// The booking to cancel.
    pub booking_id: String,
    /// Why the booking is cancelled.
    pub reason: String,
}

/// API response for a successful cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelBookingResponse {
    /// The audit event ID of the cancellation.
    pub event_id: i64,
    /// The booking that was cancelled.
    pub booking_id: String,
    /// A success message.
    pub message: String,
}

/// Ticket details as shown to holders and staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketInfo {
    /// The booking identifier.
    pub booking_id: String,
    /// The event the booking admits to.
    pub event_id: String,
    /// The scan code printed on the ticket.
    pub scan_code: String,
    /// Wire form of the status (`confirmed`, `used`, `cancelled`).
    pub status: String,
    /// Display form of the status.
    pub status_label: String,
    /// Number of admissions.
    pub ticket_count: u32,
    /// Total price in dirham.
    pub total_price_minor: u64,
    /// Display form of the price (`Free` or an amount in LYD).
    pub price_label: String,
    /// When the booking was made, RFC 3339.
    pub booked_at: String,
    /// Text for sharing the ticket.
    pub share_message: String,
}

/// API response listing bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBookingsResponse {
    /// The event filter that was applied, if any.
    pub event_id: Option<String>,
    /// Matching tickets, oldest registration first.
    pub tickets: Vec<TicketInfo>,
}

/// A single audit event in API form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInfo {
    /// The audit event ID.
    pub event_id: Option<i64>,
    /// Who performed the action.
    pub actor_id: String,
    /// The actor's role.
    pub actor_type: String,
    /// The request that caused the action.
    pub cause_id: String,
    /// What was done.
    pub action: String,
    /// Action details.
    pub details: Option<String>,
    /// Booking state before the action.
    pub before: String,
    /// Booking state after the action.
    pub after: String,
}

/// API response for a booking's audit timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTimelineResponse {
    /// The booking whose history this is.
    pub booking_id: String,
    /// Events, oldest first.
    pub events: Vec<AuditEventInfo>,
}

/// API request to evaluate a scanned payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// The raw decoded payload.
    pub payload: String,
}

/// API request to confirm the pending admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    /// The booking shown to the operator.
    pub booking_id: String,
}

/// Details of a booking being admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionInfo {
    /// The booking identifier.
    pub booking_id: String,
    /// The event the booking admits to.
    pub event_id: String,
    /// Number of people to let through.
    pub ticket_count: u32,
    /// Total price in dirham.
    pub total_price_minor: u64,
    /// Display form of the price.
    pub price_label: String,
}

/// Operator-facing text for a scan outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeMessage {
    /// Short headline.
    pub title: String,
    /// Longer explanation.
    pub body: String,
}

/// API response for `scan_ticket` and `confirm_admission`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResponse {
    /// The outcome tag (`admissible`, `admitted`, `invalid`, ...).
    pub outcome: String,
    /// The matched booking, if any.
    pub booking_id: Option<String>,
    /// Admission details for `admissible` and `admitted`.
    pub admission: Option<AdmissionInfo>,
    /// What to show the operator.
    pub message: OutcomeMessage,
    /// True if an admission is still awaiting confirmation.
    pub awaiting_confirmation: bool,
}

/// API response for `discard_scan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardResponse {
    /// The booking whose admission was abandoned, if one was pending.
    pub discarded_booking_id: Option<String>,
}

/// API response describing a scanning device's engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerStateResponse {
    /// `idle`, `evaluating`, or `awaiting_confirmation`.
    pub state: String,
    /// The pending booking, if any.
    pub pending_booking_id: Option<String>,
}
