// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The per-device ticket validation engine.
//!
//! A scan is handled in two phases. `evaluate` looks a payload up and, if
//! the booking may be admitted, parks it as a pending admission. The
//! operator then either `confirm`s, which consumes the booking through a
//! compare-and-set on the store, or `discard`s, which leaves it untouched.
//!
//! The engine refuses overlapping work: while an admission is pending,
//! no new payload is evaluated.

use mi3ad_audit::{Actor, Cause};
use mi3ad_domain::{Booking, BookingId, BookingStatus, EventId, Price, TicketCount};

use crate::apply::apply;
use crate::command::Command;
use crate::error::CoreError;
use crate::state::TransitionResult;
use crate::store::{BookingStore, StoreError};

/// What the operator sees for an admissible booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// The booking being admitted.
    pub booking_id: BookingId,
    /// The event the booking admits to.
    pub event_id: EventId,
    /// Number of people to let through.
    pub ticket_count: TicketCount,
    /// Total price paid.
    pub total_price: Price,
}

impl Admission {
    fn from_booking(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id().clone(),
            event_id: booking.event_id().clone(),
            ticket_count: booking.ticket_count(),
            total_price: booking.total_price(),
        }
    }
}

/// The result of one engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The booking may be admitted and awaits confirmation.
    Admissible(Admission),
    /// The booking was consumed and the holder admitted.
    Admitted(Admission),
    /// No booking matches the payload.
    Invalid,
    /// The booking has already been used.
    AlreadyUsed {
        /// The matched booking.
        booking_id: BookingId,
    },
    /// The booking was cancelled.
    Cancelled {
        /// The matched booking.
        booking_id: BookingId,
    },
    /// The status change could not be written; the admission is still pending.
    UpdateFailed {
        /// The pending booking.
        booking_id: BookingId,
        /// Store-reported detail.
        reason: String,
    },
    /// The lookup could not be performed; nothing changed.
    LookupFailed {
        /// Store-reported detail.
        reason: String,
    },
}

impl Outcome {
    /// Returns true if this outcome admitted the holder.
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }

    /// Returns the `snake_case` tag of this outcome.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Admissible(_) => "admissible",
            Self::Admitted(_) => "admitted",
            Self::Invalid => "invalid",
            Self::AlreadyUsed { .. } => "already_used",
            Self::Cancelled { .. } => "cancelled",
            Self::UpdateFailed { .. } => "update_failed",
            Self::LookupFailed { .. } => "lookup_failed",
        }
    }

    fn for_terminal(booking: &Booking) -> Option<Self> {
        if booking.is_admissible() {
            return None;
        }
        match booking.status() {
            BookingStatus::Used => Some(Self::AlreadyUsed {
                booking_id: booking.id().clone(),
            }),
            BookingStatus::Cancelled => Some(Self::Cancelled {
                booking_id: booking.id().clone(),
            }),
            BookingStatus::Confirmed => None,
        }
    }
}

/// Where the engine is in the scan cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    /// Ready to evaluate a payload.
    Idle,
    /// A lookup is running.
    ///
    /// `evaluate` always leaves this state before returning, so it is only
    /// observable after a store call panicked mid-lookup; `discard` clears it.
    Evaluating,
    /// An admissible booking awaits `confirm` or `discard`.
    AwaitingConfirmation {
        /// The booking as read during evaluation.
        booking: Booking,
    },
}

/// Validates scanned tickets for one device.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    state: EngineState,
    actor: Actor,
}

impl ValidationEngine {
    /// Creates an idle engine that attributes its changes to `actor`.
    #[must_use]
    pub const fn new(actor: Actor) -> Self {
        Self {
            state: EngineState::Idle,
            actor,
        }
    }

    /// Returns the current engine state.
    #[must_use]
    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    /// Returns the actor this engine acts as.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Hands the device to another operator.
    ///
    /// Later confirmations, including one for an admission already
    /// pending, are attributed to `actor`.
    pub fn set_actor(&mut self, actor: Actor) {
        self.actor = actor;
    }

    /// Returns the booking awaiting confirmation, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&Booking> {
        match &self.state {
            EngineState::AwaitingConfirmation { booking } => Some(booking),
            EngineState::Idle | EngineState::Evaluating => None,
        }
    }

    /// Evaluates a scanned payload.
    ///
    /// Never mutates the store. An admissible booking is parked until
    /// `confirm` or `discard`.
    ///
    /// # Errors
    ///
    /// - `CoreError::ConfirmationPending` if an admission awaits confirmation
    /// - `CoreError::EvaluationInProgress` if a previous evaluation never finished
    pub fn evaluate<S>(&mut self, store: &mut S, payload: &str) -> Result<Outcome, CoreError>
    where
        S: BookingStore + ?Sized,
    {
        match &self.state {
            EngineState::AwaitingConfirmation { booking } => {
                return Err(CoreError::ConfirmationPending {
                    booking_id: booking.id().clone(),
                });
            }
            EngineState::Evaluating => return Err(CoreError::EvaluationInProgress),
            EngineState::Idle => {}
        }

        if payload.is_empty() {
            return Ok(Outcome::Invalid);
        }

        self.state = EngineState::Evaluating;

        let found: Option<Booking> = match store.find_by_scan_code(payload) {
            Ok(found) => found,
            Err(err) => {
                self.state = EngineState::Idle;
                return Ok(Outcome::LookupFailed {
                    reason: err.to_string(),
                });
            }
        };

        let Some(booking) = found.filter(|b| b.scan_code().matches(payload)) else {
            self.state = EngineState::Idle;
            return Ok(Outcome::Invalid);
        };

        if let Some(outcome) = Outcome::for_terminal(&booking) {
            self.state = EngineState::Idle;
            return Ok(outcome);
        }

        let admission: Admission = Admission::from_booking(&booking);
        self.state = EngineState::AwaitingConfirmation { booking };
        Ok(Outcome::Admissible(admission))
    }

    /// Confirms the pending admission, consuming the booking.
    ///
    /// The booking is re-read first; the write itself is conditional on the
    /// booking still being `confirmed`, so a concurrent admission elsewhere
    /// is reported as `AlreadyUsed` rather than admitting twice. A failed
    /// write keeps the admission pending for a retry or discard.
    ///
    /// # Errors
    ///
    /// - `CoreError::NoPendingAdmission` if nothing awaits confirmation
    /// - `CoreError::BookingMismatch` if `booking_id` is not the pending booking
    pub fn confirm<S>(
        &mut self,
        store: &mut S,
        booking_id: &BookingId,
        cause: Cause,
    ) -> Result<Outcome, CoreError>
    where
        S: BookingStore + ?Sized,
    {
        let Some(pending) = self.pending() else {
            return Err(CoreError::NoPendingAdmission);
        };

        if pending.id() != booking_id {
            return Err(CoreError::BookingMismatch {
                expected: pending.id().clone(),
                actual: booking_id.clone(),
            });
        }

        let current: Booking = match store.find_by_id(booking_id) {
            Ok(Some(booking)) => booking,
            Ok(None) => {
                return Ok(Outcome::UpdateFailed {
                    booking_id: booking_id.clone(),
                    reason: StoreError::NotFound {
                        booking_id: booking_id.clone(),
                    }
                    .to_string(),
                });
            }
            Err(err) => {
                return Ok(Outcome::UpdateFailed {
                    booking_id: booking_id.clone(),
                    reason: err.to_string(),
                });
            }
        };

        if let Some(outcome) = Outcome::for_terminal(&current) {
            self.state = EngineState::Idle;
            return Ok(outcome);
        }

        let transition: TransitionResult =
            apply(&current, Command::Admit, self.actor.clone(), cause)?;

        match store.set_status(
            booking_id,
            BookingStatus::Confirmed,
            transition.new_booking.status(),
            &transition.audit_event,
        ) {
            Ok(()) => {
                self.state = EngineState::Idle;
                Ok(Outcome::Admitted(Admission::from_booking(
                    &transition.new_booking,
                )))
            }
            Err(StoreError::StatusConflict {
                actual: BookingStatus::Used,
                ..
            }) => {
                self.state = EngineState::Idle;
                Ok(Outcome::AlreadyUsed {
                    booking_id: booking_id.clone(),
                })
            }
            Err(StoreError::StatusConflict {
                actual: BookingStatus::Cancelled,
                ..
            }) => {
                self.state = EngineState::Idle;
                Ok(Outcome::Cancelled {
                    booking_id: booking_id.clone(),
                })
            }
            Err(err) => Ok(Outcome::UpdateFailed {
                booking_id: booking_id.clone(),
                reason: err.to_string(),
            }),
        }
    }

    /// Abandons any pending admission and returns to `Idle`.
    ///
    /// Returns the abandoned booking id. Discarding an idle engine is a no-op.
    pub fn discard(&mut self) -> Option<BookingId> {
        match std::mem::replace(&mut self.state, EngineState::Idle) {
            EngineState::AwaitingConfirmation { booking } => Some(booking.id().clone()),
            EngineState::Idle | EngineState::Evaluating => None,
        }
    }
}
