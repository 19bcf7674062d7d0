// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use mi3ad::RegistrationResult;
use mi3ad_audit::AuditEvent;
use mi3ad_domain::{Booking, BookingId, BookingStatus};
use num_traits::ToPrimitive;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

use crate::diesel_schema::bookings;
use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::queries::bookings::{booking_exists, scan_code_exists};

fn now_rfc3339() -> Result<String, PersistenceError> {
    Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}

fn insert_booking(conn: &mut SqliteConnection, booking: &Booking) -> Result<(), PersistenceError> {
    let ticket_count: i32 = booking.ticket_count().get().to_i32().ok_or_else(|| {
        PersistenceError::SerializationError("Ticket count out of range".to_string())
    })?;
    let total_price_minor: i64 = booking
        .total_price()
        .minor_units()
        .to_i64()
        .ok_or_else(|| PersistenceError::SerializationError("Price out of range".to_string()))?;
    let booked_at: String = booking.booked_at().format(&Rfc3339)?;
    let now: String = now_rfc3339()?;

    diesel::insert_into(bookings::table)
        .values((
            bookings::booking_id.eq(booking.id().value()),
            bookings::event_id.eq(booking.event_id().value()),
            bookings::scan_code.eq(booking.scan_code().value()),
            bookings::status.eq(booking.status().as_str()),
            bookings::ticket_count.eq(ticket_count),
            bookings::total_price_minor.eq(total_price_minor),
            bookings::created_at.eq(&booked_at),
            bookings::updated_at.eq(&now),
        ))
        .execute(conn)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
                if info.message().contains("scan_code") =>
            {
                PersistenceError::DuplicateScanCode(booking.scan_code().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                PersistenceError::DuplicateBooking(booking.id().to_string())
            }
            other => PersistenceError::from(other),
        })?;

    Ok(())
}

/// Persists a newly registered booking and its audit event atomically.
///
/// # Returns
///
/// The event ID of the registration audit event.
///
/// # Errors
///
/// - `PersistenceError::DuplicateBooking` if the booking id is taken
/// - `PersistenceError::DuplicateScanCode` if the scan code is taken
/// - any database or serialization failure
pub fn register_booking(
    conn: &mut SqliteConnection,
    result: &RegistrationResult,
) -> Result<i64, PersistenceError> {
    let booking: &Booking = &result.booking;

    conn.transaction::<i64, PersistenceError, _>(|conn| {
        if booking_exists(conn, booking.id())? {
            return Err(PersistenceError::DuplicateBooking(booking.id().to_string()));
        }
        if scan_code_exists(conn, booking.scan_code().value())? {
            return Err(PersistenceError::DuplicateScanCode(
                booking.scan_code().to_string(),
            ));
        }

        insert_booking(conn, booking)?;
        let event_id: i64 = persist_audit_event(conn, &result.audit_event)?;

        info!(
            event_id,
            booking_id = %booking.id(),
            event = %booking.event_id(),
            "Registered booking"
        );
        Ok(event_id)
    })
}

/// Changes a booking's status only if it currently holds `expected`.
///
/// The update and the audit event insert share one transaction. The
/// `WHERE status = expected` guard makes this safe against a concurrent
/// writer on the same database: exactly one of two racing callers sees a
/// row updated.
///
/// # Returns
///
/// The event ID of the persisted audit event.
///
/// # Errors
///
/// - `PersistenceError::BookingNotFound` if the booking does not exist
/// - `PersistenceError::StatusConflict` if the current status differs
/// - any database or serialization failure
pub fn compare_and_set_status(
    conn: &mut SqliteConnection,
    booking_id: &BookingId,
    expected: BookingStatus,
    new_status: BookingStatus,
    audit_event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    conn.transaction::<i64, PersistenceError, _>(|conn| {
        let now: String = now_rfc3339()?;

        let updated: usize = diesel::update(
            bookings::table
                .filter(bookings::booking_id.eq(booking_id.value()))
                .filter(bookings::status.eq(expected.as_str())),
        )
        .set((
            bookings::status.eq(new_status.as_str()),
            bookings::updated_at.eq(now),
        ))
        .execute(conn)?;

        if updated == 0 {
            let actual: Option<String> = bookings::table
                .filter(bookings::booking_id.eq(booking_id.value()))
                .select(bookings::status)
                .first::<String>(conn)
                .optional()?;

            let Some(actual) = actual else {
                return Err(PersistenceError::BookingNotFound(booking_id.to_string()));
            };
            let actual: BookingStatus = actual
                .parse()
                .map_err(|e: mi3ad_domain::DomainError| {
                    PersistenceError::ReconstructionError(e.to_string())
                })?;

            debug!(
                booking_id = %booking_id,
                %expected,
                %actual,
                "Conditional status change lost"
            );
            return Err(PersistenceError::StatusConflict {
                booking_id: booking_id.to_string(),
                expected,
                actual,
            });
        }

        let event_id: i64 = persist_audit_event(conn, audit_event)?;

        info!(
            event_id,
            booking_id = %booking_id,
            from = %expected,
            to = %new_status,
            "Booking status changed"
        );
        Ok(event_id)
    })
}
