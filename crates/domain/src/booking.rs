// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking_status::BookingStatus;
use crate::types::{BookingId, EventId, Price, ScanCode, TicketCount};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A reservation granting admission of `ticket_count` people to an event.
///
/// A booking is identified by `id` and is presented at the gate by its
/// `scan_code`. Only the status ever changes after creation; `booked_at`
/// records when the reservation was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    id: BookingId,
    event_id: EventId,
    scan_code: ScanCode,
    status: BookingStatus,
    ticket_count: TicketCount,
    total_price: Price,
    booked_at: OffsetDateTime,
}

impl Booking {
    /// Creates a new `Booking` in the given status.
    #[must_use]
    pub const fn new(
        id: BookingId,
        event_id: EventId,
        scan_code: ScanCode,
        status: BookingStatus,
        ticket_count: TicketCount,
        total_price: Price,
        booked_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            event_id,
            scan_code,
            status,
            ticket_count,
            total_price,
            booked_at,
        }
    }

    /// Returns the booking identifier.
    #[must_use]
    pub const fn id(&self) -> &BookingId {
        &self.id
    }

    /// Returns the event this booking admits to.
    #[must_use]
    pub const fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Returns the scan code printed on the ticket.
    #[must_use]
    pub const fn scan_code(&self) -> &ScanCode {
        &self.scan_code
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> BookingStatus {
        self.status
    }

    /// Returns the number of admissions.
    #[must_use]
    pub const fn ticket_count(&self) -> TicketCount {
        self.ticket_count
    }

    /// Returns the total price paid.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        self.total_price
    }

    /// Returns when the booking was made.
    #[must_use]
    pub const fn booked_at(&self) -> OffsetDateTime {
        self.booked_at
    }

    /// Returns a copy of this booking with a different status.
    ///
    /// No lifecycle check is performed here; callers validate the
    /// transition first.
    #[must_use]
    pub fn with_status(&self, status: BookingStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Returns true if the booking may still be admitted.
    #[must_use]
    pub const fn is_admissible(&self) -> bool {
        matches!(self.status, BookingStatus::Confirmed)
    }
}
