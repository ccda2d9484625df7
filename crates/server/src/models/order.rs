//! Order and payment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kebuncuan_core::{Money, OrderId, OrderStatus, PaymentId, PaymentStatus, ProductId, UserId};

/// Recipient snapshot captured at checkout.
///
/// Denormalized on purpose: the order must keep shipping to the address the
/// buyer confirmed even if their profile changes later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    /// Courier aggregator area ID for the destination.
    #[serde(default)]
    pub area_id: String,
    #[serde(default)]
    pub postal_code: String,
}

/// An order for a single product.
///
/// Cart checkout creates one order per cart line. Status changes go through
/// [`OrderStatus::transition`]; nothing mutates the field directly.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub invoice: String,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub status: OrderStatus,
    pub shipping_required: bool,
    pub recipient: RecipientInfo,
    /// Chosen shipping method, absent for digital orders.
    pub courier_company: Option<String>,
    pub courier_type: Option<String>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax: Money,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A payment against an order. Its status gates shipment creation.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub method: String,
    pub status: PaymentStatus,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}
