// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use mi3ad::StoreError;
use mi3ad_domain::{BookingId, BookingStatus};

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// The requested event was not found.
    EventNotFound(i64),
    /// The requested booking was not found.
    BookingNotFound(String),
    /// A booking with the same id already exists.
    DuplicateBooking(String),
    /// The scan code is already assigned to a booking.
    DuplicateScanCode(String),
    /// A conditional status change found a different current status.
    StatusConflict {
        booking_id: String,
        expected: BookingStatus,
        actual: BookingStatus,
    },
    /// A stored row could not be turned back into a domain value.
    ReconstructionError(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// The requested resource was not found.
    NotFound(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::EventNotFound(id) => write!(f, "Event not found: {id}"),
            Self::BookingNotFound(id) => write!(f, "Booking not found: {id}"),
            Self::DuplicateBooking(id) => write!(f, "Booking '{id}' already exists"),
            Self::DuplicateScanCode(code) => {
                write!(f, "Scan code '{code}' is already assigned to a booking")
            }
            Self::StatusConflict {
                booking_id,
                expected,
                actual,
            } => write!(
                f,
                "Booking '{booking_id}' is {actual}, expected {expected}"
            ),
            Self::ReconstructionError(msg) => write!(f, "Reconstruction error: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<time::error::Format> for PersistenceError {
    fn from(err: time::error::Format) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::BookingNotFound(id) => Self::NotFound {
                booking_id: BookingId::new(&id),
            },
            PersistenceError::StatusConflict {
                booking_id,
                expected,
                actual,
            } => Self::StatusConflict {
                booking_id: BookingId::new(&booking_id),
                expected,
                actual,
            },
            PersistenceError::DuplicateBooking(id) => Self::DuplicateBooking {
                booking_id: BookingId::new(&id),
            },
            PersistenceError::DuplicateScanCode(scan_code) => {
                Self::DuplicateScanCode { scan_code }
            }
            other => Self::Unavailable {
                message: other.to_string(),
            },
        }
    }
}
