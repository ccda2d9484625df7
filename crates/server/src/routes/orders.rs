//! Merchant order routes: listing, detail, status updates, and the
//! shipment trigger.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kebuncuan_core::{Email, OrderId, OrderStatus, PaymentStatus, UserId};

use super::parse_slug;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::order::{Order, Payment};
use crate::models::shipment::Shipment;
use crate::models::store::Store;
use crate::db::{OrderRepository, ShipmentRepository, StoreRepository, UserRepository};
use crate::services::ShipmentService;
use crate::state::AppState;

/// Buyer block in an order detail response.
#[derive(Debug, Serialize)]
pub struct BuyerInfo {
    pub id: UserId,
    pub email: Email,
    pub name: String,
}

/// Order detail response.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub payment: Option<Payment>,
    pub shipment: Option<Shipment>,
    pub buyer: Option<BuyerInfo>,
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: OrderStatus,
}

/// List orders for an owned store, newest first.
#[instrument(skip(state, user))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(store): Path<String>,
) -> Result<impl IntoResponse> {
    let store = owned_store(&state, user.id, &store).await?;
    let orders = OrderRepository::new(state.pool())
        .list_for_store(store.id)
        .await?;

    Ok(Json(orders))
}

/// Detail for one order: payment, shipment, and buyer account.
#[instrument(skip(state, user))]
pub async fn detail(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((store, order_id)): Path<(String, OrderId)>,
) -> Result<impl IntoResponse> {
    let store = owned_store(&state, user.id, &store).await?;

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_for_store(order_id, store.id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

    let payment = orders.latest_payment(order.id).await?;
    let shipment = ShipmentRepository::new(state.pool())
        .find_by_order(order.id)
        .await?;
    let buyer = UserRepository::new(state.pool())
        .get_by_id(order.user_id)
        .await?
        .map(|u| BuyerInfo {
            id: u.id,
            email: u.email,
            name: u.name,
        });

    Ok(Json(OrderDetail {
        order,
        payment,
        shipment,
        buyer,
    }))
}

/// Update an order's status through the transition table.
///
/// Marking an order PAID settles its pending payment; CANCELLED cancels it.
/// The external payment confirmation collaborator calls this with PAID.
#[instrument(skip(state, user))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((store, order_id)): Path<(String, OrderId)>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<impl IntoResponse> {
    let store = owned_store(&state, user.id, &store).await?;

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_for_store(order_id, store.id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

    // The transition table is the guard; an illegal move is a 409.
    let next = order.status.transition(body.status)?;
    orders.set_status(order.id, next).await?;

    // Keep the pending payment in step with the order.
    let payment_status = match next {
        OrderStatus::Paid => Some(PaymentStatus::Paid),
        OrderStatus::Cancelled => Some(PaymentStatus::Cancelled),
        _ => None,
    };
    if let Some(target) = payment_status
        && let Some(payment) = orders.latest_payment(order.id).await?
        && payment.status.can_transition(target)
    {
        orders.set_payment_status(payment.id, target).await?;
    }

    let updated = orders
        .get_for_store(order_id, store.id)
        .await?
        .ok_or_else(|| AppError::Internal("order vanished during update".to_string()))?;

    Ok(Json(updated))
}

/// Create a shipment for a paid, shipping-required order.
#[instrument(skip(state, user))]
pub async fn ship(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((store, order_id)): Path<(String, OrderId)>,
) -> Result<impl IntoResponse> {
    let slug = parse_slug(&store)?;
    let shipment = ShipmentService::new(state.pool(), state.biteship())
        .create_shipment(user.id, &slug, order_id)
        .await?;

    Ok((StatusCode::CREATED, Json(shipment)))
}

/// Resolve an owned store from a raw path slug; mismatch reads as missing.
async fn owned_store(state: &AppState, user_id: UserId, raw_slug: &str) -> Result<Store> {
    let slug = parse_slug(raw_slug)?;
    StoreRepository::new(state.pool())
        .find_owned_by_slug(&slug, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("store not found".to_string()))
}
