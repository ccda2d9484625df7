//! Store repository.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use kebuncuan_core::{Slug, StoreId, UserId};

use super::RepositoryError;
use crate::models::store::{ShippingProviderConfig, Store};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i32,
    slug: String,
    name: String,
    owner_id: i32,
    address: String,
    postal_code: String,
    contact_name: String,
    contact_phone: String,
    tax_enabled: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;

        Ok(Self {
            id: StoreId::new(row.id),
            slug,
            name: row.name,
            owner_id: UserId::new(row.owner_id),
            address: row.address,
            postal_code: row.postal_code,
            contact_name: row.contact_name,
            contact_phone: row.contact_phone,
            tax_enabled: row.tax_enabled,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ShippingProviderRow {
    id: i32,
    store_id: i32,
    active: bool,
    origin_area_id: String,
    quota_used: i32,
    quota_limit: i32,
}

impl From<ShippingProviderRow> for ShippingProviderConfig {
    fn from(row: ShippingProviderRow) -> Self {
        Self {
            id: row.id.into(),
            store_id: StoreId::new(row.store_id),
            active: row.active,
            origin_area_id: row.origin_area_id,
            quota_used: row.quota_used,
            quota_limit: row.quota_limit,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

const STORE_COLUMNS: &str = "id, slug, name, owner_id, address, postal_code, \
     contact_name, contact_phone, tax_enabled, deleted_at, created_at";

/// Repository for store and shipping-provider configuration lookups.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up an active (not soft-deleted) store by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM store WHERE slug = $1 AND deleted_at IS NULL"
        ))
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Look up an active store by slug, requiring `owner` to own it.
    ///
    /// Ownership mismatch is indistinguishable from a missing store on
    /// purpose: merchant routes 404 rather than leak tenant existence.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn find_owned_by_slug(
        &self,
        slug: &Slug,
        owner: UserId,
    ) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM store \
             WHERE slug = $1 AND owner_id = $2 AND deleted_at IS NULL"
        ))
        .bind(slug.as_str())
        .bind(owner.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Fetch the courier configuration for a store, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shipping_provider(
        &self,
        store_id: StoreId,
    ) -> Result<Option<ShippingProviderConfig>, RepositoryError> {
        let row = sqlx::query_as::<_, ShippingProviderRow>(
            "SELECT id, store_id, active, origin_area_id, quota_used, quota_limit \
             FROM shipping_provider WHERE store_id = $1",
        )
        .bind(store_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}

/// Record one allocated shipment against the store's quota.
///
/// Runs inside the shipment-creation transaction so the quota moves with
/// the shipment insert or not at all.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn increment_provider_quota(
    tx: &mut Transaction<'_, Postgres>,
    store_id: StoreId,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE shipping_provider SET quota_used = quota_used + 1 WHERE store_id = $1")
        .bind(store_id.as_i32())
        .execute(&mut **tx)
        .await
        .map_err(RepositoryError::from_sqlx)?;

    Ok(())
}
