//! Cart route handlers.
//!
//! JSON CRUD over the buyer's per-store cart. The buyer comes from the
//! session; the store comes from the request.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use kebuncuan_core::{CartItemId, ProductId};

use super::parse_slug;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::CartService;
use crate::state::AppState;

/// Query for viewing a cart.
#[derive(Debug, Deserialize)]
pub struct ShowCartQuery {
    pub store: String,
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartBody {
    pub store: String,
    pub product_id: ProductId,
    pub quantity: Option<i32>,
}

/// Update cart item request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartBody {
    pub cart_item_id: CartItemId,
    pub quantity: i32,
}

/// Remove cart item request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartBody {
    pub cart_item_id: CartItemId,
}

/// View the buyer's cart for a store.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ShowCartQuery>,
) -> Result<impl IntoResponse> {
    let slug = parse_slug(&query.store)?;
    let view = CartService::new(state.pool()).view(user.id, &slug).await?;

    Ok(Json(view))
}

/// Add an item to the buyer's cart, folding repeated adds.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddToCartBody>,
) -> Result<impl IntoResponse> {
    let slug = parse_slug(&body.store)?;
    let item = CartService::new(state.pool())
        .add_item(user.id, &slug, body.product_id, body.quantity.unwrap_or(1))
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Update a line's quantity; zero or less removes the line.
#[instrument(skip(state, user))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<UpdateCartBody>,
) -> Result<impl IntoResponse> {
    let item = CartService::new(state.pool())
        .update_item(user.id, body.cart_item_id, body.quantity)
        .await?;

    Ok(Json(serde_json::json!({
        "removed": item.is_none(),
        "item": item,
    })))
}

/// Remove a line outright.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<RemoveFromCartBody>,
) -> Result<impl IntoResponse> {
    CartService::new(state.pool())
        .remove_item(user.id, body.cart_item_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
