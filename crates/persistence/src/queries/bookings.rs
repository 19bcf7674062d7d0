// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use mi3ad_domain::{
    Booking, BookingId, BookingStatus, EventId, Price, ScanCode, TicketCount,
};
use num_traits::ToPrimitive;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::data_models::BookingRow;
use crate::diesel_schema::bookings;
use crate::error::PersistenceError;

impl TryFrom<BookingRow> for Booking {
    type Error = PersistenceError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row
            .status
            .parse()
            .map_err(|e: mi3ad_domain::DomainError| {
                PersistenceError::ReconstructionError(e.to_string())
            })?;

        let count: u32 = row.ticket_count.to_u32().ok_or_else(|| {
            PersistenceError::ReconstructionError(format!(
                "Ticket count {} out of range for booking {}",
                row.ticket_count, row.booking_id
            ))
        })?;
        let ticket_count: TicketCount = TicketCount::new(count)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;

        let minor_units: u64 = row.total_price_minor.to_u64().ok_or_else(|| {
            PersistenceError::ReconstructionError(format!(
                "Negative price for booking {}",
                row.booking_id
            ))
        })?;

        let booked_at: OffsetDateTime =
            OffsetDateTime::parse(&row.created_at, &Rfc3339).map_err(|e| {
                PersistenceError::ReconstructionError(format!(
                    "Invalid booking date for booking {}: {e}",
                    row.booking_id
                ))
            })?;

        Ok(Self::new(
            BookingId::new(&row.booking_id),
            EventId::new(&row.event_id),
            ScanCode::new(&row.scan_code),
            status,
            ticket_count,
            Price::from_minor_units(minor_units),
            booked_at,
        ))
    }
}

/// Finds a booking by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_booking(
    conn: &mut SqliteConnection,
    booking_id: &BookingId,
) -> Result<Option<Booking>, PersistenceError> {
    bookings::table
        .filter(bookings::booking_id.eq(booking_id.value()))
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()?
        .map(Booking::try_from)
        .transpose()
}

/// Finds a booking by exact scan code.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_booking_by_scan_code(
    conn: &mut SqliteConnection,
    scan_code: &str,
) -> Result<Option<Booking>, PersistenceError> {
    bookings::table
        .filter(bookings::scan_code.eq(scan_code))
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()?
        .map(Booking::try_from)
        .transpose()
}

/// Lists bookings, optionally restricted to one event.
///
/// Ordered by booking date, then booking id.
///
/// # Errors
///
/// Returns an error if the query fails or any row is malformed.
pub fn list_bookings(
    conn: &mut SqliteConnection,
    event_id: Option<&EventId>,
) -> Result<Vec<Booking>, PersistenceError> {
    let mut query = bookings::table
        .select(BookingRow::as_select())
        .order((bookings::created_at.asc(), bookings::booking_id.asc()))
        .into_boxed::<diesel::sqlite::Sqlite>();

    if let Some(event_id) = event_id {
        query = query.filter(bookings::event_id.eq(event_id.value().to_string()));
    }

    query
        .load::<BookingRow>(conn)?
        .into_iter()
        .map(Booking::try_from)
        .collect()
}

/// Counts bookings currently in `status`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_bookings_by_status(
    conn: &mut SqliteConnection,
    status: BookingStatus,
) -> Result<usize, PersistenceError> {
    let count: i64 = bookings::table
        .filter(bookings::status.eq(status.as_str()))
        .count()
        .get_result(conn)?;

    count
        .to_usize()
        .ok_or_else(|| PersistenceError::ReconstructionError("Count out of range".to_string()))
}

/// Returns true if a booking with this id exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn booking_exists(
    conn: &mut SqliteConnection,
    booking_id: &BookingId,
) -> Result<bool, PersistenceError> {
    Ok(diesel::select(diesel::dsl::exists(
        bookings::table.filter(bookings::booking_id.eq(booking_id.value())),
    ))
    .get_result(conn)?)
}

/// Returns true if any booking holds this scan code.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn scan_code_exists(
    conn: &mut SqliteConnection,
    scan_code: &str,
) -> Result<bool, PersistenceError> {
    Ok(diesel::select(diesel::dsl::exists(
        bookings::table.filter(bookings::scan_code.eq(scan_code)),
    ))
    .get_result(conn)?)
}
