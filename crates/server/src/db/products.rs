//! Product repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kebuncuan_core::{CategoryId, Money, ProductId, StoreId};

use super::RepositoryError;
use crate::models::product::Product;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub(crate) id: i32,
    pub(crate) store_id: i32,
    pub(crate) category_id: i32,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) price: Money,
    pub(crate) modal_price: Money,
    pub(crate) weight_grams: i32,
    pub(crate) active: bool,
    pub(crate) images: Vec<String>,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            store_id: StoreId::new(row.store_id),
            category_id: CategoryId::new(row.category_id),
            name: row.name,
            description: row.description,
            price: row.price,
            modal_price: row.modal_price,
            weight_grams: row.weight_grams,
            active: row.active,
            images: row.images,
            created_at: row.created_at,
        }
    }
}

pub(crate) const PRODUCT_COLUMNS: &str = "id, store_id, category_id, name, description, \
     price, modal_price, weight_grams, active, images, created_at";

/// Repository for catalog lookups.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an active product that belongs to the given store.
    ///
    /// An inactive product, or one from another store, is `None` - callers
    /// treat both the same way a missing product is treated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_in_store(
        &self,
        product_id: ProductId,
        store_id: StoreId,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product \
             WHERE id = $1 AND store_id = $2 AND active = TRUE"
        ))
        .bind(product_id.as_i32())
        .bind(store_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a product by ID regardless of active flag.
    ///
    /// Fulfillment flows use this: an order may reference a product that was
    /// deactivated after purchase.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, product_id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(product_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
