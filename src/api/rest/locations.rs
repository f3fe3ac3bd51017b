use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::routing::get;
use serde::Deserialize;

use crate::error::AppError;
use crate::geo::gazetteer::LocationResolver;
use crate::models::booking::Location;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/locations", get(lookup_location))
}

/// A location given either as coordinates or as free text to resolve.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LocationInput {
    Resolved(Location),
    Address(String),
}

impl LocationInput {
    pub fn resolve(self, resolver: &dyn LocationResolver) -> Result<Location, AppError> {
        match self {
            LocationInput::Resolved(location) => Ok(location),
            LocationInput::Address(query) => resolver.resolve(&query),
        }
    }
}

#[derive(Deserialize)]
pub struct LocationQuery {
    pub q: String,
}

async fn lookup_location(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<Location>, AppError> {
    let location = state.resolver.resolve(&query.q)?;
    Ok(Json(location))
}
