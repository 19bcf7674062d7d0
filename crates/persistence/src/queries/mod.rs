// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `audit` — Audit event and per-booking timeline queries
//! - `bookings` — Booking lookups, listings and counts

pub mod audit;
pub mod bookings;
