// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking::Booking;
use crate::error::DomainError;
use crate::types::{MAX_PRICE_MINOR_UNITS, MAX_SCAN_CODE_LEN, ScanCode};

/// Validates that a booking's basic field constraints are met.
///
/// This function checks identifiers, the price bound and the scan code
/// shape. Uniqueness is enforced by the store.
///
/// # Errors
///
/// Returns an error if:
/// - The booking id is empty
/// - The event id is empty
/// - The total price exceeds `MAX_PRICE_MINOR_UNITS`
/// - The scan code is empty, too long, or padded with whitespace
pub fn validate_booking_fields(booking: &Booking) -> Result<(), DomainError> {
    if booking.id().value().trim().is_empty() {
        return Err(DomainError::InvalidBookingId(String::from(
            "Booking id cannot be empty",
        )));
    }

    if booking.event_id().value().trim().is_empty() {
        return Err(DomainError::InvalidEventId(String::from(
            "Event id cannot be empty",
        )));
    }

    let minor_units: u64 = booking.total_price().minor_units();
    if minor_units > MAX_PRICE_MINOR_UNITS {
        return Err(DomainError::InvalidPrice { minor_units });
    }

    validate_scan_code(booking.scan_code())
}

/// Validates the shape of a scan code.
///
/// Ticket count is checked at construction time via `TicketCount::new()`.
///
/// # Errors
///
/// Returns `DomainError::InvalidScanCode` if the code is empty, longer than
/// `MAX_SCAN_CODE_LEN` bytes, or has leading or trailing whitespace.
pub fn validate_scan_code(scan_code: &ScanCode) -> Result<(), DomainError> {
    let value: &str = scan_code.value();

    if value.is_empty() {
        return Err(DomainError::InvalidScanCode(String::from(
            "Scan code cannot be empty",
        )));
    }

    if value.len() > MAX_SCAN_CODE_LEN {
        return Err(DomainError::InvalidScanCode(format!(
            "Scan code must be at most {MAX_SCAN_CODE_LEN} bytes, got {}",
            value.len()
        )));
    }

    if value.trim() != value {
        return Err(DomainError::InvalidScanCode(String::from(
            "Scan code cannot start or end with whitespace",
        )));
    }

    Ok(())
}
