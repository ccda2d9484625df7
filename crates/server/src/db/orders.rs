//! Order and payment repository.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use kebuncuan_core::{Money, OrderId, OrderStatus, PaymentId, PaymentStatus, ProductId, StoreId, UserId};

use super::RepositoryError;
use crate::models::order::{Order, Payment, RecipientInfo};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    invoice: String,
    user_id: i32,
    product_id: i32,
    quantity: i32,
    status: String,
    shipping_required: bool,
    recipient_name: String,
    recipient_phone: String,
    recipient_address: String,
    recipient_area_id: String,
    recipient_postal: String,
    courier_company: Option<String>,
    courier_type: Option<String>,
    subtotal: Money,
    shipping_cost: Money,
    tax: Money,
    total: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            invoice: row.invoice,
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            status,
            shipping_required: row.shipping_required,
            recipient: RecipientInfo {
                name: row.recipient_name,
                phone: row.recipient_phone,
                address: row.recipient_address,
                area_id: row.recipient_area_id,
                postal_code: row.recipient_postal,
            },
            courier_company: row.courier_company,
            courier_type: row.courier_type,
            subtotal: row.subtotal,
            shipping_cost: row.shipping_cost,
            tax: row.tax,
            total: row.total,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i32,
    order_id: i32,
    method: String,
    status: String,
    amount: Money,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = RepositoryError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<PaymentStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment status in database: {e}"))
        })?;

        Ok(Self {
            id: PaymentId::new(row.id),
            order_id: OrderId::new(row.order_id),
            method: row.method,
            status,
            amount: row.amount,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

const ORDER_COLUMNS: &str = "id, invoice, user_id, product_id, quantity, status, \
     shipping_required, recipient_name, recipient_phone, recipient_address, \
     recipient_area_id, recipient_postal, courier_company, courier_type, \
     subtotal, shipping_cost, tax, total, created_at, updated_at";

/// Everything needed to persist one order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub invoice: String,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub shipping_required: bool,
    pub recipient: RecipientInfo,
    pub courier_company: Option<String>,
    pub courier_type: Option<String>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax: Money,
    pub total: Money,
}

/// Repository for order and payment operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders whose product belongs to the store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_for_store(&self, store_id: StoreId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders o \
             WHERE EXISTS (SELECT 1 FROM product p WHERE p.id = o.product_id AND p.store_id = $1) \
             ORDER BY o.created_at DESC",
            qualified_order_columns()
        ))
        .bind(store_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an order scoped to a store's catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_for_store(
        &self,
        order_id: OrderId,
        store_id: StoreId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders o \
             WHERE o.id = $1 \
               AND EXISTS (SELECT 1 FROM product p WHERE p.id = o.product_id AND p.store_id = $2)",
            qualified_order_columns()
        ))
        .bind(order_id.as_i32())
        .bind(store_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Most recent payment for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn latest_payment(
        &self,
        order_id: OrderId,
    ) -> Result<Option<Payment>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            "SELECT id, order_id, method, status, amount, created_at \
             FROM payment WHERE order_id = $1 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(order_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Persist an order status the service already validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
            .bind(order_id.as_i32())
            .bind(status.to_string())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Persist a payment status the service already validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_payment_status(
        &self,
        payment_id: PaymentId,
        status: PaymentStatus,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE payment SET status = $2, updated_at = now() WHERE id = $1")
            .bind(payment_id.as_i32())
            .bind(status.to_string())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

/// Insert an order inside the checkout transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` on invoice collision.
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_order(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewOrder,
) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "INSERT INTO orders (invoice, user_id, product_id, quantity, status, \
                             shipping_required, recipient_name, recipient_phone, \
                             recipient_address, recipient_area_id, recipient_postal, \
                             courier_company, courier_type, subtotal, shipping_cost, tax, total) \
         VALUES ($1, $2, $3, $4, 'PENDING', $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(&new.invoice)
    .bind(new.user_id.as_i32())
    .bind(new.product_id.as_i32())
    .bind(new.quantity)
    .bind(new.shipping_required)
    .bind(&new.recipient.name)
    .bind(&new.recipient.phone)
    .bind(&new.recipient.address)
    .bind(&new.recipient.area_id)
    .bind(&new.recipient.postal_code)
    .bind(&new.courier_company)
    .bind(&new.courier_type)
    .bind(new.subtotal)
    .bind(new.shipping_cost)
    .bind(new.tax)
    .bind(new.total)
    .fetch_one(&mut **tx)
    .await
    .map_err(RepositoryError::from_sqlx)?;

    row.try_into()
}

/// Insert a PENDING payment inside the checkout transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_payment(
    tx: &mut Transaction<'_, Postgres>,
    order_id: OrderId,
    method: &str,
    amount: Money,
) -> Result<Payment, RepositoryError> {
    let row = sqlx::query_as::<_, PaymentRow>(
        "INSERT INTO payment (order_id, method, status, amount) \
         VALUES ($1, $2, 'PENDING', $3) \
         RETURNING id, order_id, method, status, amount, created_at",
    )
    .bind(order_id.as_i32())
    .bind(method)
    .bind(amount)
    .fetch_one(&mut **tx)
    .await
    .map_err(RepositoryError::from_sqlx)?;

    row.try_into()
}

/// Order column list qualified with the `o` alias used by scoped queries.
fn qualified_order_columns() -> String {
    ORDER_COLUMNS
        .split(", ")
        .map(|c| format!("o.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_order_columns() {
        let columns = qualified_order_columns();
        assert!(columns.starts_with("o.id, o.invoice"));
        assert!(columns.ends_with("o.created_at, o.updated_at"));
        assert!(!columns.contains("o.o."));
    }
}
