// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Mi3AD ticket gate.
//!
//! This crate stores bookings and their audit events in `SQLite` through
//! Diesel, and implements the `BookingStore` seam used by the validation
//! engine.
//!
//! ## Backend
//!
//! - In-memory databases are used for tests; each instance is isolated.
//! - File databases run in WAL mode so readers do not block the writer.
//!
//! Migrations are embedded and applied on open. Foreign key enforcement is
//! switched on and verified before the adapter is handed out.
//!
//! ## Concurrency
//!
//! Status changes are conditional updates. Several gate processes sharing
//! one database file cannot admit the same booking twice.

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

use diesel::SqliteConnection;
use mi3ad::{BookingStore, RegistrationResult, StoreError, TransitionResult};
use mi3ad_audit::AuditEvent;
use mi3ad_domain::{Booking, BookingId, BookingStatus, EventId};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::sqlite::MIGRATIONS;
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for bookings and audit events.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared-cache database, so instances never
    /// see each other's data.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_gate_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;

        backend::PersistenceBackend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;

        backend::sqlite::enable_wal_mode(&mut conn)?;

        backend::PersistenceBackend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    // ========================================================================
    // Booking Mutations
    // ========================================================================

    /// Persists a newly registered booking together with its audit event.
    ///
    /// # Returns
    ///
    /// The event ID of the registration audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking id or scan code is already taken, or
    /// if persistence fails.
    pub fn register_booking(&mut self, result: &RegistrationResult) -> Result<i64, PersistenceError> {
        mutations::register_booking(&mut self.conn, result)
    }

    /// Persists a status transition produced by `apply`.
    ///
    /// The write only succeeds if the stored status still equals the status
    /// the transition started from.
    ///
    /// # Returns
    ///
    /// The event ID of the transition audit event.
    ///
    /// # Errors
    ///
    /// - `PersistenceError::StatusConflict` if the booking changed meanwhile
    /// - `PersistenceError::BookingNotFound` if the booking does not exist
    pub fn persist_transition(
        &mut self,
        expected: BookingStatus,
        result: &TransitionResult,
    ) -> Result<i64, PersistenceError> {
        mutations::compare_and_set_status(
            &mut self.conn,
            result.new_booking.id(),
            expected,
            result.new_booking.status(),
            &result.audit_event,
        )
    }

    // ========================================================================
    // Booking Queries
    // ========================================================================

    /// Retrieves a booking by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BookingNotFound` if no such booking exists.
    pub fn get_booking(&mut self, booking_id: &BookingId) -> Result<Booking, PersistenceError> {
        queries::bookings::find_booking(&mut self.conn, booking_id)?
            .ok_or_else(|| PersistenceError::BookingNotFound(booking_id.to_string()))
    }

    /// Lists bookings, optionally restricted to one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_bookings(
        &mut self,
        event_id: Option<&EventId>,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::list_bookings(&mut self.conn, event_id)
    }

    /// Counts bookings currently in `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_bookings_by_status(
        &mut self,
        status: BookingStatus,
    ) -> Result<usize, PersistenceError> {
        queries::bookings::count_bookings_by_status(&mut self.conn, status)
    }

    // ========================================================================
    // Audit Event Queries
    // ========================================================================

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Retrieves all audit events for a booking, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_booking_audit_timeline(
        &mut self,
        booking_id: &BookingId,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::get_booking_audit_timeline(&mut self.conn, booking_id)
    }
}

impl BookingStore for Persistence {
    fn find_by_scan_code(&mut self, scan_code: &str) -> Result<Option<Booking>, StoreError> {
        queries::bookings::find_booking_by_scan_code(&mut self.conn, scan_code).map_err(|err| {
            warn!(error = %err, "Scan code lookup failed");
            StoreError::from(err)
        })
    }

    fn find_by_id(&mut self, booking_id: &BookingId) -> Result<Option<Booking>, StoreError> {
        queries::bookings::find_booking(&mut self.conn, booking_id).map_err(|err| {
            warn!(booking_id = %booking_id, error = %err, "Booking lookup failed");
            StoreError::from(err)
        })
    }

    fn set_status(
        &mut self,
        booking_id: &BookingId,
        expected: BookingStatus,
        new_status: BookingStatus,
        audit_event: &AuditEvent,
    ) -> Result<(), StoreError> {
        mutations::compare_and_set_status(
            &mut self.conn,
            booking_id,
            expected,
            new_status,
            audit_event,
        )
        .map(|_| ())
        .map_err(StoreError::from)
    }
}
