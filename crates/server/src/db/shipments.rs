//! Shipment repository.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use kebuncuan_core::{Money, OrderId, ShipmentId, ShipmentStatus, StoreId};

use super::RepositoryError;
use crate::models::shipment::Shipment;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ShipmentRow {
    id: i32,
    order_id: i32,
    biteship_order_id: Option<String>,
    waybill: Option<String>,
    courier_company: String,
    courier_type: String,
    recipient_name: String,
    recipient_phone: String,
    recipient_address: String,
    price: Money,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ShipmentRow> for Shipment {
    type Error = RepositoryError;

    fn try_from(row: ShipmentRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<ShipmentStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid shipment status in database: {e}"))
        })?;

        Ok(Self {
            id: ShipmentId::new(row.id),
            order_id: OrderId::new(row.order_id),
            biteship_order_id: row.biteship_order_id,
            waybill: row.waybill,
            courier_company: row.courier_company,
            courier_type: row.courier_type,
            recipient_name: row.recipient_name,
            recipient_phone: row.recipient_phone,
            recipient_address: row.recipient_address,
            price: row.price,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

const SHIPMENT_COLUMNS: &str = "id, order_id, biteship_order_id, waybill, courier_company, \
     courier_type, recipient_name, recipient_phone, recipient_address, price, status, \
     created_at, updated_at";

/// Everything needed to persist one shipment after provider allocation.
#[derive(Debug, Clone)]
pub struct NewShipment {
    pub order_id: OrderId,
    pub biteship_order_id: Option<String>,
    pub waybill: Option<String>,
    pub courier_company: String,
    pub courier_type: String,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: String,
    pub price: Money,
    pub status: ShipmentStatus,
}

/// Repository for shipment operations.
pub struct ShipmentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShipmentRepository<'a> {
    /// Create a new shipment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the shipment for an order, if one was created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn find_by_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<Shipment>, RepositoryError> {
        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipment WHERE order_id = $1"
        ))
        .bind(order_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a shipment scoped to a store (via its order's product).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_for_store(
        &self,
        shipment_id: ShipmentId,
        store_id: StoreId,
    ) -> Result<Option<Shipment>, RepositoryError> {
        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            "SELECT {} FROM shipment s \
             WHERE s.id = $1 AND EXISTS ( \
                 SELECT 1 FROM orders o \
                 JOIN product p ON p.id = o.product_id \
                 WHERE o.id = s.order_id AND p.store_id = $2)",
            qualified_shipment_columns()
        ))
        .bind(shipment_id.as_i32())
        .bind(store_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Refresh a stored shipment's status from a tracking response.
    ///
    /// Returns the updated shipment, or `None` when no row matches the
    /// waybill within the store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn update_tracking(
        &self,
        store_id: StoreId,
        waybill: &str,
        status: ShipmentStatus,
    ) -> Result<Option<Shipment>, RepositoryError> {
        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            "UPDATE shipment s SET status = $3, updated_at = now() \
             WHERE s.waybill = $2 AND EXISTS ( \
                 SELECT 1 FROM orders o \
                 JOIN product p ON p.id = o.product_id \
                 WHERE o.id = s.order_id AND p.store_id = $1) \
             RETURNING {}",
            qualified_shipment_columns()
        ))
        .bind(store_id.as_i32())
        .bind(waybill)
        .bind(status.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

/// Whether a shipment row already exists for the order.
///
/// Runs on the shipment-creation transaction so the serializable isolation
/// level covers the check.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn exists_for_order(
    tx: &mut Transaction<'_, Postgres>,
    order_id: OrderId,
) -> Result<bool, RepositoryError> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM shipment WHERE order_id = $1)")
            .bind(order_id.as_i32())
            .fetch_one(&mut **tx)
            .await?;

    Ok(exists)
}

/// Insert a shipment inside the creation transaction.
///
/// The unique constraint on `order_id` turns a concurrent duplicate into
/// `RepositoryError::Conflict`.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if a shipment already exists.
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_shipment(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewShipment,
) -> Result<Shipment, RepositoryError> {
    let row = sqlx::query_as::<_, ShipmentRow>(&format!(
        "INSERT INTO shipment (order_id, biteship_order_id, waybill, courier_company, \
                               courier_type, recipient_name, recipient_phone, \
                               recipient_address, price, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {SHIPMENT_COLUMNS}"
    ))
    .bind(new.order_id.as_i32())
    .bind(&new.biteship_order_id)
    .bind(&new.waybill)
    .bind(&new.courier_company)
    .bind(&new.courier_type)
    .bind(&new.recipient_name)
    .bind(&new.recipient_phone)
    .bind(&new.recipient_address)
    .bind(new.price)
    .bind(new.status.to_string())
    .fetch_one(&mut **tx)
    .await
    .map_err(RepositoryError::from_sqlx)?;

    row.try_into()
}

/// Shipment column list qualified with the `s` alias used by scoped queries.
fn qualified_shipment_columns() -> String {
    SHIPMENT_COLUMNS
        .split(", ")
        .map(|c| format!("s.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}
