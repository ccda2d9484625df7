//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kebuncuan_core::{Money, OrderId, OrderStatus, PaymentStatus, ProductId};

use super::parse_slug;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::order::RecipientInfo;
use crate::services::CheckoutService;
use crate::services::checkout::{CheckoutCommand, CheckoutSource, ShippingSelection};
use crate::state::AppState;

/// Checkout request body.
///
/// With `product_id` set this is a buy-now checkout for that product;
/// otherwise the buyer's cart for the store is drained.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub store: String,
    pub product_id: Option<ProductId>,
    pub quantity: Option<i32>,
    /// Selected shipping method; omit for orders without physical shipping.
    pub shipping: Option<ShippingSelection>,
    pub payment_method: String,
    pub recipient: RecipientInfo,
}

/// One created order in the response.
#[derive(Debug, Serialize)]
pub struct CreatedOrder {
    pub id: OrderId,
    pub invoice: String,
    pub status: OrderStatus,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax: Money,
    pub total: Money,
    pub payment_status: PaymentStatus,
}

/// Checkout response body.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub orders: Vec<CreatedOrder>,
    /// Where to send the buyer to settle payment.
    pub payment_redirect: String,
}

/// Create order(s) from a cart or a single product.
#[instrument(skip(state, user, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CheckoutBody>,
) -> Result<impl IntoResponse> {
    let slug = parse_slug(&body.store)?;

    let source = match body.product_id {
        Some(product_id) => CheckoutSource::BuyNow {
            product_id,
            quantity: body.quantity.unwrap_or(1),
        },
        None => CheckoutSource::Cart,
    };

    let outcome = CheckoutService::new(state.pool())
        .checkout(
            user.id,
            &slug,
            CheckoutCommand {
                source,
                shipping: body.shipping,
                payment_method: body.payment_method,
                recipient: body.recipient,
            },
        )
        .await?;

    let orders = outcome
        .orders
        .into_iter()
        .map(|(order, payment)| CreatedOrder {
            id: order.id,
            invoice: order.invoice,
            status: order.status,
            subtotal: order.subtotal,
            shipping_cost: order.shipping_cost,
            tax: order.tax,
            total: order.total,
            payment_status: payment.status,
        })
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            orders,
            payment_redirect: outcome.payment_redirect,
        }),
    ))
}
