// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staff identity extraction for the server.
//!
//! Every request names its actor through two headers:
//!
//! - `X-Actor-Id`: the staff member or device operator
//! - `X-Actor-Role`: `admin` or `gatekeeper`
//!
//! The pair is checked with `authenticate_stub`; role enforcement happens
//! later, in the API handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use mi3ad_api::{AuthenticatedActor, Role, authenticate_stub};
use tracing::{debug, warn};

/// Header carrying the actor id.
pub const ACTOR_ID_HEADER: &str = "X-Actor-Id";

/// Header carrying the actor role.
pub const ACTOR_ROLE_HEADER: &str = "X-Actor-Role";

/// Extractor for the authenticated staff member behind a request.
///
/// ```ignore
/// async fn my_handler(
///     StaffIdentity(actor): StaffIdentity,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
/// }
/// ```
pub struct StaffIdentity(pub AuthenticatedActor);

impl<S> FromRequestParts<S> for StaffIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id: &str = header_value(parts, ACTOR_ID_HEADER)?;
        let role_str: &str = header_value(parts, ACTOR_ROLE_HEADER)?;

        let role: Role = parse_role(role_str)?;

        let actor: AuthenticatedActor =
            authenticate_stub(actor_id.to_string(), role).map_err(|e| {
                warn!(error = %e, "Actor authentication failed");
                IdentityError::AuthenticationFailed(e.to_string())
            })?;

        debug!(actor_id = %actor.id, role = ?actor.role, "Actor identified");

        Ok(Self(actor))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &'static str) -> Result<&'a str, IdentityError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| {
            debug!(header = name, "Missing identity header");
            IdentityError::MissingHeader(name)
        })?
        .to_str()
        .map_err(|_| {
            warn!(header = name, "Invalid identity header encoding");
            IdentityError::InvalidHeader(name)
        })
}

/// Parses a role string into a `Role`.
fn parse_role(role_str: &str) -> Result<Role, IdentityError> {
    match role_str.to_lowercase().as_str() {
        "admin" => Ok(Role::Admin),
        "gatekeeper" => Ok(Role::Gatekeeper),
        _ => Err(IdentityError::InvalidRole(role_str.to_string())),
    }
}

/// Identity extraction errors.
#[derive(Debug)]
pub enum IdentityError {
    /// A required header is missing.
    MissingHeader(&'static str),
    /// A header is not valid visible ASCII.
    InvalidHeader(&'static str),
    /// The role is neither `admin` nor `gatekeeper`.
    InvalidRole(String),
    /// The actor could not be authenticated.
    AuthenticationFailed(String),
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let (status, message): (StatusCode, String) = match self {
            Self::MissingHeader(name) => (StatusCode::UNAUTHORIZED, format!("Missing {name} header")),
            Self::InvalidHeader(name) => (StatusCode::UNAUTHORIZED, format!("Invalid {name} header")),
            Self::InvalidRole(role) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid role: '{role}'. Must be 'admin' or 'gatekeeper'"),
            ),
            Self::AuthenticationFailed(reason) => (StatusCode::UNAUTHORIZED, reason),
        };

        crate::HttpError { status, message }.into_response()
    }
}
