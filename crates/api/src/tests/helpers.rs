// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use mi3ad::ValidationEngine;
use mi3ad_audit::Cause;
use mi3ad_persistence::{Persistence, PersistenceError};

use crate::{AuthenticatedActor, RegisterBookingRequest, Role, register_booking};

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-123"), Role::Admin)
}

pub fn create_test_gatekeeper() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("gate-1"), Role::Gatekeeper)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn create_test_engine() -> ValidationEngine {
    ValidationEngine::new(create_test_gatekeeper().to_audit_actor())
}

pub fn booking_request(
    booking_id: &str,
    scan_code: Option<&str>,
    ticket_count: u32,
    total_price_minor: u64,
) -> RegisterBookingRequest {
    RegisterBookingRequest {
        booking_id: String::from(booking_id),
        event_id: String::from("evt-1"),
        scan_code: scan_code.map(String::from),
        ticket_count,
        total_price_minor,
    }
}

/// Persistence with `b1`/`QR-001` (2 tickets, free) and `b2`/`QR-002`
/// (1 ticket, 25 LYD), both confirmed.
pub fn setup_test_persistence() -> Result<Persistence, PersistenceError> {
    let mut persistence: Persistence = Persistence::new_in_memory()?;
    let admin: AuthenticatedActor = create_test_admin();

    for request in [
        booking_request("b1", Some("QR-001"), 2, 0),
        booking_request("b2", Some("QR-002"), 1, 25_000),
    ] {
        register_booking(&mut persistence, request, &admin, create_test_cause())
            .map_err(|e| PersistenceError::InitializationError(e.to_string()))?;
    }

    Ok(persistence)
}
