//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                         - Liveness check
//! GET  /health/ready                                   - DB readiness check
//!
//! # Cart (buyer, requires session)
//! GET    /api/cart?store={slug}                        - View cart
//! POST   /api/cart                                     - Add item
//! PUT    /api/cart                                     - Update item quantity
//! DELETE /api/cart                                     - Remove item
//!
//! # Checkout (buyer, requires session)
//! POST /api/checkout                                   - Create order(s)
//!
//! # Orders (merchant, requires session + store ownership)
//! GET   /api/store/{store}/orders                      - List orders
//! GET   /api/store/{store}/orders/{id}                 - Order detail
//! PATCH /api/store/{store}/orders/{id}                 - Update order status
//! POST  /api/store/{store}/orders/{id}/ship            - Create shipment
//!
//! # Shipping
//! POST /api/store/{store}/shipping/rates               - Courier rate quotes (public)
//! GET  /api/store/{store}/shipping/shipments/{id}/label - Label URL (merchant)
//! POST /api/store/{store}/shipping/track/{waybill}     - Tracking (merchant)
//! ```

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod shipping;

use axum::{
    Router,
    routing::{get, post},
};

use kebuncuan_core::Slug;

use crate::error::AppError;
use crate::state::AppState;

/// Create the full API router.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cart",
            get(cart::show)
                .post(cart::add)
                .put(cart::update)
                .delete(cart::remove),
        )
        .route("/checkout", post(checkout::create))
        .nest("/store/{store}", store_routes())
}

fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::list))
        .route(
            "/orders/{order_id}",
            get(orders::detail).patch(orders::update_status),
        )
        .route("/orders/{order_id}/ship", post(orders::ship))
        .route("/shipping/rates", post(shipping::rates))
        .route(
            "/shipping/shipments/{shipment_id}/label",
            get(shipping::label),
        )
        .route("/shipping/track/{waybill}", post(shipping::track))
}

/// Parse a slug from route input, rejecting malformed values early.
pub(crate) fn parse_slug(raw: &str) -> Result<Slug, AppError> {
    Slug::parse(raw).map_err(|e| AppError::BadRequest(format!("invalid store slug: {e}")))
}
