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
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod identity;
mod scanners;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use mi3ad_api::{
    ApiError, AuditTimelineResponse, AuthorizationService, CancelBookingRequest,
    CancelBookingResponse, ConfirmRequest, DiscardResponse, ListBookingsResponse,
    RegisterBookingRequest, RegisterBookingResponse, ScanRequest, ScanResponse,
    ScannerStateResponse, TicketInfo, cancel_booking, confirm_admission, discard_scan,
    get_booking_audit_timeline, get_ticket, list_bookings, register_booking, scan_ticket,
    scanner_state,
};
use mi3ad_audit::Cause;
use mi3ad_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::identity::StaffIdentity;
use crate::scanners::{ScannerRegistry, SharedEngine};

/// Mi3AD Gate Server - HTTP server for ticket validation at event entrances
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: IpAddr,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// Bookings and their audit trail.
    persistence: Arc<Mutex<Persistence>>,
    /// One validation engine per scanning device.
    scanners: Arc<ScannerRegistry>,
}

impl AppState {
    fn new(persistence: Persistence) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            scanners: Arc::new(ScannerRegistry::new()),
        }
    }
}

/// API request for registering a booking.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RegisterBookingApiRequest {
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The booking identifier.
    booking_id: String,
    /// The event the booking admits to.
    event_id: String,
    /// The scan code; generated when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scan_code: Option<String>,
    /// Number of admissions.
    ticket_count: u32,
    /// Total price in dirham.
    total_price_minor: u64,
}

/// API request for cancelling a booking.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CancelBookingApiRequest {
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// Why the booking is cancelled.
    reason: String,
}

/// Query parameters for listing bookings.
#[derive(Debug, Deserialize)]
struct ListBookingsQuery {
    /// Restrict the listing to one event.
    event_id: Option<String>,
}

/// API request carrying a scanned payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ScanApiRequest {
    /// The raw decoded payload.
    payload: String,
}

/// API request confirming a pending admission.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ConfirmApiRequest {
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The booking shown to the operator.
    booking_id: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl HttpError {
    fn scanner_busy(device_id: &str) -> Self {
        warn!(device_id = %device_id, "Scanner busy");
        Self {
            status: StatusCode::CONFLICT,
            message: format!("Scanner '{device_id}' is busy with another request"),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Handler for POST `/bookings` endpoint.
async fn handle_register_booking(
    AxumState(app_state): AxumState<AppState>,
    StaffIdentity(actor): StaffIdentity,
    Json(req): Json<RegisterBookingApiRequest>,
) -> Result<Json<RegisterBookingResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        booking_id = %req.booking_id,
        event_id = %req.event_id,
        "Handling register_booking request"
    );

    let cause: Cause = Cause::new(req.cause_id, req.cause_description);
    let request: RegisterBookingRequest = RegisterBookingRequest {
        booking_id: req.booking_id,
        event_id: req.event_id,
        scan_code: req.scan_code,
        ticket_count: req.ticket_count,
        total_price_minor: req.total_price_minor,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: RegisterBookingResponse =
        register_booking(&mut persistence, request, &actor, cause)?;

    Ok(Json(response))
}

/// Handler for GET `/bookings` endpoint.
async fn handle_list_bookings(
    AxumState(app_state): AxumState<AppState>,
    StaffIdentity(_actor): StaffIdentity,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<ListBookingsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListBookingsResponse =
        list_bookings(&mut persistence, query.event_id.as_deref())?;

    Ok(Json(response))
}

/// Handler for GET `/bookings/{booking_id}` endpoint.
async fn handle_get_ticket(
    AxumState(app_state): AxumState<AppState>,
    StaffIdentity(_actor): StaffIdentity,
    Path(booking_id): Path<String>,
) -> Result<Json<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let ticket: TicketInfo = get_ticket(&mut persistence, &booking_id)?;

    Ok(Json(ticket))
}

/// Handler for POST `/bookings/{booking_id}/cancel` endpoint.
async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    StaffIdentity(actor): StaffIdentity,
    Path(booking_id): Path<String>,
    Json(req): Json<CancelBookingApiRequest>,
) -> Result<Json<CancelBookingResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        booking_id = %booking_id,
        "Handling cancel_booking request"
    );

    let cause: Cause = Cause::new(req.cause_id, req.cause_description);
    let request: CancelBookingRequest = CancelBookingRequest {
        booking_id,
        reason: req.reason,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: CancelBookingResponse = cancel_booking(&mut persistence, request, &actor, cause)?;

    Ok(Json(response))
}

/// Handler for GET `/bookings/{booking_id}/audit` endpoint.
async fn handle_get_booking_audit(
    AxumState(app_state): AxumState<AppState>,
    StaffIdentity(actor): StaffIdentity,
    Path(booking_id): Path<String>,
) -> Result<Json<AuditTimelineResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AuditTimelineResponse =
        get_booking_audit_timeline(&mut persistence, &booking_id, &actor)?;

    Ok(Json(response))
}

/// Handler for POST `/scanners/{device_id}/scan` endpoint.
///
/// A device that is still handling a request answers 409 instead of queueing.
async fn handle_scan(
    AxumState(app_state): AxumState<AppState>,
    StaffIdentity(actor): StaffIdentity,
    Path(device_id): Path<String>,
    Json(req): Json<ScanApiRequest>,
) -> Result<Json<ScanResponse>, HttpError> {
    AuthorizationService::authorize_scan(&actor).map_err(ApiError::from)?;

    let shared: SharedEngine = app_state.scanners.get_or_create(&device_id, &actor).await;
    let mut engine = shared
        .try_lock()
        .map_err(|_| HttpError::scanner_busy(&device_id))?;

    let mut persistence = app_state.persistence.lock().await;
    let response: ScanResponse = scan_ticket(
        &mut engine,
        &mut *persistence,
        &ScanRequest {
            payload: req.payload,
        },
        &actor,
    )?;

    info!(device_id = %device_id, outcome = %response.outcome, "Scan evaluated");

    Ok(Json(response))
}

/// Handler for POST `/scanners/{device_id}/confirm` endpoint.
async fn handle_confirm(
    AxumState(app_state): AxumState<AppState>,
    StaffIdentity(actor): StaffIdentity,
    Path(device_id): Path<String>,
    Json(req): Json<ConfirmApiRequest>,
) -> Result<Json<ScanResponse>, HttpError> {
    AuthorizationService::authorize_confirm(&actor).map_err(ApiError::from)?;

    let Some(shared) = app_state.scanners.get(&device_id).await else {
        return Err(HttpError::from(ApiError::Conflict {
            message: format!("Scanner '{device_id}' has no admission awaiting confirmation"),
        }));
    };
    let mut engine = shared
        .try_lock()
        .map_err(|_| HttpError::scanner_busy(&device_id))?;

    let cause: Cause = Cause::new(req.cause_id, req.cause_description);
    let mut persistence = app_state.persistence.lock().await;
    let response: ScanResponse = confirm_admission(
        &mut engine,
        &mut *persistence,
        &ConfirmRequest {
            booking_id: req.booking_id,
        },
        &actor,
        cause,
    )?;

    info!(device_id = %device_id, outcome = %response.outcome, "Confirmation handled");

    Ok(Json(response))
}

/// Handler for POST `/scanners/{device_id}/discard` endpoint.
async fn handle_discard(
    AxumState(app_state): AxumState<AppState>,
    StaffIdentity(actor): StaffIdentity,
    Path(device_id): Path<String>,
) -> Result<Json<DiscardResponse>, HttpError> {
    AuthorizationService::authorize_discard(&actor).map_err(ApiError::from)?;

    let Some(shared) = app_state.scanners.get(&device_id).await else {
        return Ok(Json(DiscardResponse {
            discarded_booking_id: None,
        }));
    };
    let mut engine = shared
        .try_lock()
        .map_err(|_| HttpError::scanner_busy(&device_id))?;

    let response: DiscardResponse = discard_scan(&mut engine, &actor)?;

    Ok(Json(response))
}

/// Handler for GET `/scanners/{device_id}` endpoint.
async fn handle_scanner_state(
    AxumState(app_state): AxumState<AppState>,
    StaffIdentity(_actor): StaffIdentity,
    Path(device_id): Path<String>,
) -> Result<Json<ScannerStateResponse>, HttpError> {
    let Some(shared) = app_state.scanners.get(&device_id).await else {
        return Err(HttpError::from(ApiError::ResourceNotFound {
            resource_type: String::from("Scanner"),
            message: format!("Scanner '{device_id}' has not scanned yet"),
        }));
    };
    let engine = shared
        .try_lock()
        .map_err(|_| HttpError::scanner_busy(&device_id))?;

    Ok(Json(scanner_state(&engine)))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/bookings",
            post(handle_register_booking).get(handle_list_bookings),
        )
        .route("/bookings/{booking_id}", get(handle_get_ticket))
        .route("/bookings/{booking_id}/cancel", post(handle_cancel_booking))
        .route("/bookings/{booking_id}/audit", get(handle_get_booking_audit))
        .route("/scanners/{device_id}", get(handle_scanner_state))
        .route("/scanners/{device_id}/scan", post(handle_scan))
        .route("/scanners/{device_id}/confirm", post(handle_confirm))
        .route("/scanners/{device_id}/discard", post(handle_discard))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Mi3AD Gate Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app: Router = build_router(AppState::new(persistence));

    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
