//! Shipment model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kebuncuan_core::{Money, OrderId, ShipmentId, ShipmentStatus};

/// A shipment allocated at the courier aggregator for a paid order.
///
/// Created at most once per order. After the provider confirms allocation the
/// row is immutable except for `status` (and a waybill backfill once the
/// provider assigns one), both refreshed from tracking responses.
#[derive(Debug, Clone, Serialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub order_id: OrderId,
    /// Provider-issued order ID; absent means allocation never completed.
    pub biteship_order_id: Option<String>,
    /// Tracking number, assigned by the courier after pickup scheduling.
    pub waybill: Option<String>,
    pub courier_company: String,
    pub courier_type: String,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: String,
    pub price: Money,
    pub status: ShipmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
