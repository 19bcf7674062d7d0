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

mod apply;
mod command;
mod engine;
mod error;
mod memory;
mod state;
mod store;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply, apply_registration};
pub use command::Command;
pub use engine::{Admission, EngineState, Outcome, ValidationEngine};
pub use error::CoreError;
pub use memory::InMemoryBookingStore;
pub use state::{BookingRegistration, RegistrationResult, TransitionResult};
pub use store::{BookingStore, StoreError};
