//! Cart repository.
//!
//! The two cart invariants (one cart per buyer per store, one line per
//! product per cart) are enforced by unique constraints; the queries here
//! lean on `ON CONFLICT` instead of check-then-insert.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use kebuncuan_core::{CartId, CartItemId, ProductId, StoreId, UserId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartItem, CartLine};
use crate::models::product::Product;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: i32,
    store_id: i32,
    created_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user_id: UserId::new(row.user_id),
            store_id: StoreId::new(row.store_id),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    cart_id: i32,
    product_id: i32,
    quantity: i32,
    created_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            cart_id: CartId::new(row.cart_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}

/// Flattened cart line with its product, aliased to avoid column clashes.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    item_id: i32,
    cart_id: i32,
    product_id: i32,
    quantity: i32,
    item_created_at: DateTime<Utc>,
    p_store_id: i32,
    p_category_id: i32,
    p_name: String,
    p_description: String,
    p_price: kebuncuan_core::Money,
    p_modal_price: kebuncuan_core::Money,
    p_weight_grams: i32,
    p_active: bool,
    p_images: Vec<String>,
    p_created_at: DateTime<Utc>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            item: CartItem {
                id: CartItemId::new(row.item_id),
                cart_id: CartId::new(row.cart_id),
                product_id: ProductId::new(row.product_id),
                quantity: row.quantity,
                created_at: row.item_created_at,
            },
            product: Product {
                id: ProductId::new(row.product_id),
                store_id: StoreId::new(row.p_store_id),
                category_id: row.p_category_id.into(),
                name: row.p_name,
                description: row.p_description,
                price: row.p_price,
                modal_price: row.p_modal_price,
                weight_grams: row.p_weight_grams,
                active: row.p_active,
                images: row.p_images,
                created_at: row.p_created_at,
            },
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the buyer's cart for a store, creating an empty one if missing.
    ///
    /// Idempotent: concurrent calls race on the unique constraint and both
    /// end up reading the same row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Cart, RepositoryError> {
        sqlx::query(
            "INSERT INTO cart (user_id, store_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, store_id) DO NOTHING",
        )
        .bind(user_id.as_i32())
        .bind(store_id.as_i32())
        .execute(self.pool)
        .await?;

        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, store_id, created_at FROM cart \
             WHERE user_id = $1 AND store_id = $2",
        )
        .bind(user_id.as_i32())
        .bind(store_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Add a product to a cart, folding a repeated add into the quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            "INSERT INTO cart_item (cart_id, product_id, quantity) VALUES ($1, $2, $3) \
             ON CONFLICT (cart_id, product_id) \
             DO UPDATE SET quantity = cart_item.quantity + EXCLUDED.quantity \
             RETURNING id, cart_id, product_id, quantity, created_at",
        )
        .bind(cart_id.as_i32())
        .bind(product_id.as_i32())
        .bind(quantity)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        Ok(row.into())
    }

    /// Find a cart item, requiring it to sit in one of `user_id`'s carts.
    ///
    /// Ownership mismatch reads as a missing item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_item_for_user(
        &self,
        item_id: CartItemId,
        user_id: UserId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            "SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, ci.created_at \
             FROM cart_item ci \
             JOIN cart c ON c.id = ci.cart_id \
             WHERE ci.id = $1 AND c.user_id = $2",
        )
        .bind(item_id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Replace a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            "UPDATE cart_item SET quantity = $2 WHERE id = $1 \
             RETURNING id, cart_id, product_id, quantity, created_at",
        )
        .bind(item_id.as_i32())
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Delete a line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_item(&self, item_id: CartItemId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_item WHERE id = $1")
            .bind(item_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// List a cart's lines joined with their products, oldest line first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT ci.id AS item_id, ci.cart_id, ci.product_id, ci.quantity, \
                    ci.created_at AS item_created_at, \
                    p.store_id AS p_store_id, p.category_id AS p_category_id, \
                    p.name AS p_name, p.description AS p_description, \
                    p.price AS p_price, p.modal_price AS p_modal_price, \
                    p.weight_grams AS p_weight_grams, \
                    p.active AS p_active, p.images AS p_images, \
                    p.created_at AS p_created_at \
             FROM cart_item ci \
             JOIN product p ON p.id = ci.product_id \
             WHERE ci.cart_id = $1 \
             ORDER BY ci.id",
        )
        .bind(cart_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Number of lines in a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn item_count(&self, cart_id: CartId) -> Result<i64, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM cart_item WHERE cart_id = $1")
                .bind(cart_id.as_i32())
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }
}

/// Empty a cart inside the checkout transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn clear_cart(
    tx: &mut Transaction<'_, Postgres>,
    cart_id: CartId,
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM cart_item WHERE cart_id = $1")
        .bind(cart_id.as_i32())
        .execute(&mut **tx)
        .await?;

    Ok(())
}
