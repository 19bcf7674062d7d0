// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use mi3ad_audit::Actor;

use crate::error::AuthError;

/// Actor roles for authorization.
///
/// Roles determine what actions an authenticated actor may perform.
/// Ticket holders never authenticate; roles apply only to staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Admin role: back-office staff managing bookings.
    ///
    /// Admins may:
    /// - register bookings handed over by the reservation process
    /// - cancel bookings
    /// - read the audit timeline of a booking
    Admin,
    /// Gatekeeper role: staff operating a scanning device at the entrance.
    ///
    /// Gatekeepers may:
    /// - scan ticket payloads
    /// - confirm or discard a pending admission
    Gatekeeper,
}

impl Role {
    /// Returns the role name used in audit records and error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Gatekeeper => "Gatekeeper",
        }
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Converts this authenticated actor into an audit `Actor`.
    ///
    /// This is used when recording audit events to attribute actions
    /// to the staff member who performed them.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        let actor_type: String = match self.role {
            Role::Admin => String::from("admin"),
            Role::Gatekeeper => String::from("gatekeeper"),
        };
        Actor::new(self.id.clone(), actor_type)
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor is authorized to register a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_register_booking(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Admin, "register_booking")
    }

    /// Checks if an actor is authorized to cancel a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_cancel_booking(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Admin, "cancel_booking")
    }

    /// Checks if an actor is authorized to read a booking's audit timeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_read_audit(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Admin, "read_audit")
    }

    /// Checks if an actor is authorized to scan a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Gatekeeper role.
    pub fn authorize_scan(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Gatekeeper, "scan_ticket")
    }

    /// Checks if an actor is authorized to confirm a pending admission.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Gatekeeper role.
    pub fn authorize_confirm(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Gatekeeper, "confirm_admission")
    }

    /// Checks if an actor is authorized to discard a pending admission.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Gatekeeper role.
    pub fn authorize_discard(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, Role::Gatekeeper, "discard_scan")
    }

    fn require(actor: &AuthenticatedActor, role: Role, action: &str) -> Result<(), AuthError> {
        if actor.role == role {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: String::from(action),
                required_role: String::from(role.as_str()),
            })
        }
    }
}

/// Stub authentication for callers without a login flow.
///
/// Accepts any non-empty actor id with the given role.
///
/// # Errors
///
/// Returns `AuthError::AuthenticationFailed` if the actor id is empty.
pub fn authenticate_stub(actor_id: String, role: Role) -> Result<AuthenticatedActor, AuthError> {
    if actor_id.trim().is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    Ok(AuthenticatedActor::new(actor_id, role))
}
