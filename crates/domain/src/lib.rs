// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod booking;
mod booking_status;
mod error;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use booking::Booking;
pub use booking_status::BookingStatus;

// Re-export public types
pub use error::DomainError;
pub use types::{
    BookingId, EventId, MAX_PRICE_MINOR_UNITS, MAX_SCAN_CODE_LEN, MAX_TICKETS_PER_BOOKING, Price,
    ScanCode, TicketCount,
};
pub use validation::{validate_booking_fields, validate_scan_code};
