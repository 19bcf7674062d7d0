// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations for the persistence layer.
//!
//! ## Module Organization
//!
//! - `audit` — Audit event persistence
//! - `bookings` — Booking registration and conditional status changes
//!
//! Every booking mutation writes its audit event in the same transaction.

pub mod audit;
pub mod bookings;

pub use bookings::{compare_and_set_status, register_booking};
