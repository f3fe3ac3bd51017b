use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use serde::Deserialize;

use crate::api::rest::locations::LocationInput;
use crate::engine::fare::FareQuote;
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/quote", post(quote_trip))
}

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub pickup: LocationInput,
    pub dropoff: LocationInput,
}

async fn quote_trip(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<FareQuote>, AppError> {
    let pickup = payload.pickup.resolve(state.resolver.as_ref())?;
    let dropoff = payload.dropoff.resolve(state.resolver.as_ref())?;

    let quote = state.settings.fare.quote(&pickup, &dropoff)?;
    Ok(Json(quote))
}
