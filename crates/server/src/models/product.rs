//! Product model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kebuncuan_core::{CategoryId, Money, ProductId, StoreId};

/// A product in a store's catalog.
///
/// Products are deactivated rather than deleted so existing orders keep a
/// valid reference.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    /// Selling price.
    pub price: Money,
    /// Cost price, for merchant margin reporting.
    pub modal_price: Money,
    /// Package weight in grams, used for courier rate quotes.
    pub weight_grams: i32,
    pub active: bool,
    /// Ordered image URLs; the first is the cover.
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}
