use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::rest::locations::LocationInput;
use crate::engine::booking::{BookingEngine, UnknownBookingPolicy};
use crate::error::AppError;
use crate::models::booking::{Booking, BookingOutcome, BookingStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/sessions/:user_id/bookings",
            post(create_booking).get(booking_history),
        )
        .route("/sessions/:user_id/current", get(current_booking))
        .route(
            "/sessions/:user_id/bookings/:booking_id/cancel",
            post(cancel_booking),
        )
        .route(
            "/sessions/:user_id/bookings/:booking_id/status",
            patch(update_booking_status),
        )
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub pickup: LocationInput,
    pub dropoff: LocationInput,
    #[serde(default)]
    pub scheduled_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[derive(Serialize)]
pub struct CurrentBookingResponse {
    pub booking: Option<Booking>,
    pub is_booking: bool,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<BookingOutcome>, AppError> {
    let pickup = payload.pickup.resolve(state.resolver.as_ref())?;
    let dropoff = payload.dropoff.resolve(state.resolver.as_ref())?;
    let scheduled_time = payload.scheduled_time.unwrap_or_else(Utc::now);

    let booking = state
        .session(&user_id)
        .create_booking(pickup, dropoff, scheduled_time)
        .await?;

    Ok(Json(BookingOutcome::ok(
        "Booking created successfully! Looking for nearby drivers...",
        Some(booking),
    )))
}

async fn booking_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<Vec<Booking>> {
    let history = state
        .existing_session(&user_id)
        .map(|engine| engine.booking_history())
        .unwrap_or_default();

    Json(history)
}

async fn current_booking(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<CurrentBookingResponse> {
    let response = match state.existing_session(&user_id) {
        Some(engine) => CurrentBookingResponse {
            booking: engine.current_booking(),
            is_booking: engine.is_booking(),
        },
        None => CurrentBookingResponse {
            booking: None,
            is_booking: false,
        },
    };

    Json(response)
}

async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path((user_id, booking_id)): Path<(String, String)>,
) -> Result<Json<BookingOutcome>, AppError> {
    let message = "Booking cancelled successfully.";
    let Some(engine) = known_session(&state, &user_id, &booking_id)? else {
        return Ok(Json(BookingOutcome::ok(message, None)));
    };
    engine.cancel_booking(&booking_id).await?;

    Ok(Json(BookingOutcome::ok(message, engine.booking(&booking_id))))
}

async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path((user_id, booking_id)): Path<(String, String)>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<BookingOutcome>, AppError> {
    let message = format!("Booking marked {}.", payload.status);
    let Some(engine) = known_session(&state, &user_id, &booking_id)? else {
        return Ok(Json(BookingOutcome::ok(message, None)));
    };
    engine.update_booking_status(&booking_id, payload.status)?;

    Ok(Json(BookingOutcome::ok(message, engine.booking(&booking_id))))
}

/// Writes never open a session: a user without one has no bookings, so the
/// unknown-booking policy decides the answer.
fn known_session(
    state: &AppState,
    user_id: &str,
    booking_id: &str,
) -> Result<Option<BookingEngine>, AppError> {
    match state.existing_session(user_id) {
        Some(engine) => Ok(Some(engine)),
        None => match state.settings.unknown_booking {
            UnknownBookingPolicy::Reject => {
                Err(AppError::NotFound(format!("booking {booking_id} not found")))
            }
            UnknownBookingPolicy::Ignore => Ok(None),
        },
    }
}
