//! Shipping routes: rate quotes, label retrieval, and tracking.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kebuncuan_core::ShipmentId;

use super::parse_slug;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::ShipmentService;
use crate::services::shipment::{RateDestination, RateItem};
use crate::state::AppState;

/// Rate quote request body.
#[derive(Debug, Deserialize)]
pub struct RatesBody {
    pub destination: RateDestination,
    pub items: Vec<RateItem>,
}

/// Tracking request body.
#[derive(Debug, Deserialize)]
pub struct TrackBody {
    pub courier: String,
}

/// Label response body.
#[derive(Debug, Serialize)]
pub struct LabelResponse {
    pub label_url: String,
}

/// Quote courier rates from the store's origin to a destination.
///
/// Public: buyers call this at checkout to pick a shipping method.
#[instrument(skip(state, body))]
pub async fn rates(
    State(state): State<AppState>,
    Path(store): Path<String>,
    Json(body): Json<RatesBody>,
) -> Result<impl IntoResponse> {
    let slug = parse_slug(&store)?;
    let rates = ShipmentService::new(state.pool(), state.biteship())
        .rates(&slug, &body.destination, &body.items)
        .await?;

    Ok(Json(rates))
}

/// Fetch the provider's label URL for a shipment.
#[instrument(skip(state, user))]
pub async fn label(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((store, shipment_id)): Path<(String, ShipmentId)>,
) -> Result<impl IntoResponse> {
    let slug = parse_slug(&store)?;
    let label_url = ShipmentService::new(state.pool(), state.biteship())
        .label_url(user.id, &slug, shipment_id)
        .await?;

    Ok(Json(LabelResponse { label_url }))
}

/// Track a waybill and refresh the stored shipment it belongs to.
#[instrument(skip(state, user, body))]
pub async fn track(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((store, waybill)): Path<(String, String)>,
    Json(body): Json<TrackBody>,
) -> Result<impl IntoResponse> {
    let slug = parse_slug(&store)?;
    let view = ShipmentService::new(state.pool(), state.biteship())
        .track(user.id, &slug, &waybill, &body.courier)
        .await?;

    Ok(Json(view))
}
