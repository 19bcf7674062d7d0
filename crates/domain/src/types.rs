// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Upper bound on admissions granted by a single booking.
pub const MAX_TICKETS_PER_BOOKING: u32 = 100;

/// Upper bound on the byte length of a scan code.
pub const MAX_SCAN_CODE_LEN: usize = 256;

/// Number of minor units (dirham) in one Libyan dinar.
const MINOR_UNITS_PER_DINAR: u64 = 1000;

/// Upper bound on a booking's total price, in dirham (one million LYD).
pub const MAX_PRICE_MINOR_UNITS: u64 = 1_000_000 * MINOR_UNITS_PER_DINAR;

/// Opaque unique identifier of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId {
    value: String,
}

impl BookingId {
    /// Creates a new `BookingId`.
    ///
    /// The value is stored verbatim; emptiness is checked by
    /// `validate_booking_fields`.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Identifier of the event a booking admits to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId {
    value: String,
}

impl EventId {
    /// Creates a new `EventId`.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// The payload encoded in a ticket's scannable code.
///
/// Scan codes are compared exactly and case-sensitively. No normalization
/// is applied, unlike identifiers typed in by operators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanCode {
    value: String,
}

impl ScanCode {
    /// Creates a new `ScanCode` from a raw payload.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }

    /// Returns the raw payload.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true if this code is exactly the given payload.
    #[must_use]
    pub fn matches(&self, payload: &str) -> bool {
        self.value == payload
    }
}

impl std::fmt::Display for ScanCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Number of admissions granted by a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TicketCount {
    count: u32,
}

impl TicketCount {
    /// Creates a new `TicketCount`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTicketCount` if the count is zero or
    /// exceeds `MAX_TICKETS_PER_BOOKING`.
    pub fn new(count: u32) -> Result<Self, DomainError> {
        if count == 0 || count > MAX_TICKETS_PER_BOOKING {
            return Err(DomainError::InvalidTicketCount { count });
        }
        Ok(Self { count })
    }

    /// Returns the number of admissions.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.count
    }
}

impl TryFrom<u32> for TicketCount {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TicketCount> for u32 {
    fn from(value: TicketCount) -> Self {
        value.count
    }
}

/// Total price paid for a booking, in dirham (1/1000 LYD).
///
/// A zero price denotes free admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    minor_units: u64,
}

impl Price {
    /// A free admission.
    pub const FREE: Self = Self { minor_units: 0 };

    /// Creates a price from an amount in dirham.
    #[must_use]
    pub const fn from_minor_units(minor_units: u64) -> Self {
        Self { minor_units }
    }

    /// Creates a price from a whole number of dinar.
    #[must_use]
    pub const fn from_dinar(dinar: u64) -> Self {
        Self {
            minor_units: dinar.saturating_mul(MINOR_UNITS_PER_DINAR),
        }
    }

    /// Returns the amount in dirham.
    #[must_use]
    pub const fn minor_units(&self) -> u64 {
        self.minor_units
    }

    /// Returns true if this is a free admission.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.minor_units == 0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_free() {
            return f.write_str("Free");
        }
        let dinar: u64 = self.minor_units / MINOR_UNITS_PER_DINAR;
        let dirham: u64 = self.minor_units % MINOR_UNITS_PER_DINAR;
        if dirham == 0 {
            write!(f, "{dinar} LYD")
        } else {
            write!(f, "{dinar}.{dirham:03} LYD")
        }
    }
}
