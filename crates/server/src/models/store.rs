//! Store (tenant) models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kebuncuan_core::{ShippingProviderId, Slug, StoreId, UserId};

/// A merchant's storefront. The slug is the tenant routing key.
///
/// Stores are soft-deleted: `deleted_at` is set instead of removing the row,
/// and every public lookup filters deactivated stores out.
#[derive(Debug, Clone, Serialize)]
pub struct Store {
    pub id: StoreId,
    pub slug: Slug,
    pub name: String,
    pub owner_id: UserId,
    /// Origin address for shipments.
    pub address: String,
    pub postal_code: String,
    /// Contact printed on waybills.
    pub contact_name: String,
    pub contact_phone: String,
    /// Whether checkout applies the flat 10% tax.
    pub tax_enabled: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Per-store courier aggregator configuration.
///
/// The aggregator credential is platform-wide; this row scopes activation,
/// the origin area, and a shipment quota to a single store.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingProviderConfig {
    pub id: ShippingProviderId,
    pub store_id: StoreId,
    pub active: bool,
    /// Aggregator area ID for the store's origin address.
    pub origin_area_id: String,
    pub quota_used: i32,
    pub quota_limit: i32,
}

impl ShippingProviderConfig {
    /// Whether another shipment may be allocated under this store's quota.
    #[must_use]
    pub const fn has_quota(&self) -> bool {
        self.quota_used < self.quota_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(used: i32, limit: i32) -> ShippingProviderConfig {
        ShippingProviderConfig {
            id: ShippingProviderId::new(1),
            store_id: StoreId::new(1),
            active: true,
            origin_area_id: "IDNP6IDNC148".to_string(),
            quota_used: used,
            quota_limit: limit,
        }
    }

    #[test]
    fn test_quota() {
        assert!(config(0, 100).has_quota());
        assert!(config(99, 100).has_quota());
        assert!(!config(100, 100).has_quota());
    }
}
