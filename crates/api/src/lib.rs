// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the Mi3AD ticket gate.
//!
//! Requests are authorized, translated into domain types, applied through
//! the core crate and persisted. Errors from lower layers are translated
//! explicitly; none leak through unchanged.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate_stub};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error, translate_store_error,
};
pub use handlers::{
    cancel_booking, confirm_admission, discard_scan, generate_scan_code,
    get_booking_audit_timeline, get_ticket, list_bookings, outcome_message, register_booking,
    scan_ticket, scanner_state, share_message,
};
pub use request_response::{
    AdmissionInfo, AuditEventInfo, AuditTimelineResponse, CancelBookingRequest,
    CancelBookingResponse, ConfirmRequest, DiscardResponse, ListBookingsResponse,
    OutcomeMessage, RegisterBookingRequest, RegisterBookingResponse, ScanRequest, ScanResponse,
    ScannerStateResponse, TicketInfo,
};
