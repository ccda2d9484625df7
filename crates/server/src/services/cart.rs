//! Cart service.
//!
//! Pure CRUD with ownership guards; no state machine. Every mutation
//! verifies the target belongs to the calling buyer before touching it, and
//! an ownership mismatch is reported exactly like a missing row.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use kebuncuan_core::{CartItemId, ProductId, Slug, UserId};

use crate::db::{CartRepository, ProductRepository, RepositoryError, StoreRepository};
use crate::models::cart::{CartItem, CartView};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Store is missing or soft-deleted.
    #[error("store not found")]
    StoreNotFound,

    /// Product is missing, inactive, or belongs to a different store.
    #[error("product unavailable")]
    ProductUnavailable,

    /// Cart item is missing or owned by another buyer.
    #[error("cart item not found")]
    ItemNotFound,

    /// Quantity must be at least 1 when adding.
    #[error("invalid quantity")]
    InvalidQuantity,

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Cart operations for one buyer at a time.
pub struct CartService<'a> {
    pool: &'a PgPool,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The buyer's cart for a store, created empty on first access.
    ///
    /// # Errors
    ///
    /// Returns `CartError::StoreNotFound` for unknown or deactivated stores.
    #[instrument(skip(self))]
    pub async fn view(&self, user_id: UserId, store_slug: &Slug) -> Result<CartView, CartError> {
        let store = StoreRepository::new(self.pool)
            .find_by_slug(store_slug)
            .await?
            .ok_or(CartError::StoreNotFound)?;

        let carts = CartRepository::new(self.pool);
        let cart = carts.get_or_create(user_id, store.id).await?;
        let lines = carts.list_lines(cart.id).await?;

        Ok(CartView::assemble(cart, lines))
    }

    /// Add a product to the buyer's cart for the product's store.
    ///
    /// A repeated add folds into the existing line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for quantities below 1.
    /// Returns `CartError::StoreNotFound` for unknown stores.
    /// Returns `CartError::ProductUnavailable` if the product is inactive or
    /// belongs to a different store.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        store_slug: &Slug,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let store = StoreRepository::new(self.pool)
            .find_by_slug(store_slug)
            .await?
            .ok_or(CartError::StoreNotFound)?;

        let product = ProductRepository::new(self.pool)
            .get_active_in_store(product_id, store.id)
            .await?
            .ok_or(CartError::ProductUnavailable)?;

        let carts = CartRepository::new(self.pool);
        let cart = carts.get_or_create(user_id, store.id).await?;

        Ok(carts.upsert_item(cart.id, product.id, quantity).await?)
    }

    /// Set a line's quantity. Zero or less removes the line.
    ///
    /// Returns the updated line, or `None` when the line was removed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line does not exist in one of
    /// the buyer's carts.
    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<Option<CartItem>, CartError> {
        let carts = CartRepository::new(self.pool);
        let item = carts
            .find_item_for_user(item_id, user_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;

        if quantity <= 0 {
            carts.delete_item(item.id).await?;
            return Ok(None);
        }

        Ok(Some(carts.set_item_quantity(item.id, quantity).await?))
    }

    /// Remove a line outright.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line does not exist in one of
    /// the buyer's carts.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<(), CartError> {
        let carts = CartRepository::new(self.pool);
        let item = carts
            .find_item_for_user(item_id, user_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;

        carts.delete_item(item.id).await?;

        Ok(())
    }
}
