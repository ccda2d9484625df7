//! Shipment orchestration service.
//!
//! The core of fulfillment: a paid, shipping-required order is turned into a
//! courier allocation at the aggregator and mirrored as a `shipment` row.
//!
//! Exactly-once creation is enforced twice over: the existence check,
//! provider call, and insert run inside one serializable transaction, and
//! the `shipment.order_id` unique constraint backstops anything that slips
//! past it. The provider call itself carries the order invoice as
//! `reference_id`, so even a failure between provider and commit is
//! discoverable provider-side instead of silently double-allocated.

use rust_decimal::prelude::ToPrimitive;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use kebuncuan_core::{OrderId, PaymentStatus, ProductId, ShipmentId, ShipmentStatus, Slug, UserId};

use crate::biteship::{
    BiteshipClient, BiteshipError, CourierRate, CreateOrderRequest, RatesRequest, ShipmentItem,
    TrackingEvent,
};
use crate::db::shipments::{exists_for_order, insert_shipment};
use crate::db::stores::increment_provider_quota;
use crate::db::{
    NewShipment, OrderRepository, ProductRepository, RepositoryError, ShipmentRepository,
    StoreRepository,
};
use crate::models::shipment::Shipment;
use crate::models::store::Store;

/// Couriers quoted at checkout.
const QUOTED_COURIERS: &str = "jne,sicepat,anteraja,jnt";

/// Errors from shipment operations.
#[derive(Debug, Error)]
pub enum ShipmentError {
    /// Store is missing, soft-deleted, or not owned by the caller.
    #[error("store not found")]
    StoreNotFound,

    /// Order is missing or not in the store's catalog.
    #[error("order not found")]
    OrderNotFound,

    /// Shipment is missing or not in the store's catalog.
    #[error("shipment not found")]
    ShipmentNotFound,

    /// Order does not require physical shipping.
    #[error("order does not require shipping")]
    ShippingNotRequired,

    /// Order has no shipping method recorded.
    #[error("order has no courier selected")]
    NoCourierSelected,

    /// Order payment is not PAID.
    #[error("order payment is not settled")]
    PaymentNotSettled,

    /// A shipment already exists for the order.
    #[error("shipment already exists for order")]
    AlreadyShipped,

    /// Shipment was persisted without a provider order ID.
    #[error("shipment was never allocated at the provider")]
    NotAllocated,

    /// Provider has not issued a label for the allocation yet.
    #[error("label not available yet")]
    LabelUnavailable,

    /// Store has no active courier configuration.
    #[error("shipping provider not configured")]
    ProviderNotConfigured,

    /// Store exhausted its shipment quota.
    #[error("shipment quota exhausted")]
    QuotaExhausted,

    /// Courier aggregator failure.
    #[error(transparent)]
    Provider(#[from] BiteshipError),

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A tracking lookup result, after status vocabulary mapping.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TrackingView {
    pub waybill: String,
    pub courier: String,
    /// Mapped status; `None` when the provider reported vocabulary this
    /// platform does not know.
    pub status: Option<ShipmentStatus>,
    /// Raw provider status, always present for display.
    pub provider_status: String,
    pub events: Vec<TrackingEvent>,
    pub link: Option<String>,
    /// The stored shipment this waybill belongs to, refreshed, if any.
    pub shipment: Option<Shipment>,
}

/// A destination for rate quoting.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RateDestination {
    #[serde(default)]
    pub area_id: String,
    #[serde(default)]
    pub postal_code: String,
}

/// One product line in a rate quote request.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct RateItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Shipment orchestration operations.
pub struct ShipmentService<'a> {
    pool: &'a PgPool,
    biteship: &'a BiteshipClient,
}

impl<'a> ShipmentService<'a> {
    /// Create a new shipment service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, biteship: &'a BiteshipClient) -> Self {
        Self { pool, biteship }
    }

    /// Allocate a shipment for a paid, shipping-required order.
    ///
    /// Preconditions, in order: the caller owns the store; the order belongs
    /// to the store's catalog; the order requires shipping and has a courier
    /// recorded; its latest payment is PAID; the store has an active courier
    /// configuration with quota left; and no shipment exists yet.
    ///
    /// # Errors
    ///
    /// Returns the matching `ShipmentError` for each violated precondition,
    /// `ShipmentError::Provider` when the aggregator rejects the allocation,
    /// and `ShipmentError::AlreadyShipped` when racing a concurrent attempt.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn create_shipment(
        &self,
        user_id: UserId,
        store_slug: &Slug,
        order_id: OrderId,
    ) -> Result<Shipment, ShipmentError> {
        let store = self.owned_store(user_id, store_slug).await?;

        let orders = OrderRepository::new(self.pool);
        let order = orders
            .get_for_store(order_id, store.id)
            .await?
            .ok_or(ShipmentError::OrderNotFound)?;

        if !order.shipping_required {
            return Err(ShipmentError::ShippingNotRequired);
        }
        let (courier_company, courier_type) = order
            .courier_company
            .as_deref()
            .zip(order.courier_type.as_deref())
            .ok_or(ShipmentError::NoCourierSelected)?;

        let payment = orders
            .latest_payment(order.id)
            .await?
            .ok_or(ShipmentError::PaymentNotSettled)?;
        if payment.status != PaymentStatus::Paid {
            return Err(ShipmentError::PaymentNotSettled);
        }

        let stores = StoreRepository::new(self.pool);
        let provider = stores
            .shipping_provider(store.id)
            .await?
            .filter(|p| p.active)
            .ok_or(ShipmentError::ProviderNotConfigured)?;
        if !provider.has_quota() {
            return Err(ShipmentError::QuotaExhausted);
        }

        let product = ProductRepository::new(self.pool)
            .get(order.product_id)
            .await?
            .ok_or(ShipmentError::OrderNotFound)?;

        let request = CreateOrderRequest {
            origin_contact_name: store.contact_name.clone(),
            origin_contact_phone: store.contact_phone.clone(),
            origin_address: store.address.clone(),
            origin_area_id: provider.origin_area_id.clone(),
            destination_contact_name: order.recipient.name.clone(),
            destination_contact_phone: order.recipient.phone.clone(),
            destination_address: order.recipient.address.clone(),
            destination_area_id: order.recipient.area_id.clone(),
            destination_postal_code: order.recipient.postal_code.clone(),
            courier_company: courier_company.to_string(),
            courier_type: courier_type.to_string(),
            delivery_type: "now".to_string(),
            reference_id: order.invoice.clone(),
            items: vec![ShipmentItem {
                name: product.name.clone(),
                value: product.price.amount().to_i64().unwrap_or(0),
                quantity: order.quantity,
                weight: product.weight_grams,
            }],
        };

        // Check-then-create under serializable isolation; the unique
        // constraint on order_id catches anything the isolation level lets
        // through.
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        if exists_for_order(&mut tx, order.id).await? {
            return Err(ShipmentError::AlreadyShipped);
        }

        let provider_order = self.biteship.create_order(&request).await?;

        let status = ShipmentStatus::from_provider(&provider_order.status).unwrap_or_else(|| {
            tracing::warn!(
                provider_status = %provider_order.status,
                "unknown provider status on allocation, defaulting to confirmed"
            );
            ShipmentStatus::Confirmed
        });

        let new_shipment = NewShipment {
            order_id: order.id,
            biteship_order_id: Some(provider_order.id.clone()),
            waybill: provider_order.courier.waybill_id.clone(),
            courier_company: courier_company.to_string(),
            courier_type: courier_type.to_string(),
            recipient_name: order.recipient.name.clone(),
            recipient_phone: order.recipient.phone.clone(),
            recipient_address: order.recipient.address.clone(),
            price: kebuncuan_core::Money::from_rupiah(provider_order.price),
            status,
        };

        let shipment = match insert_shipment(&mut tx, &new_shipment).await {
            Ok(shipment) => shipment,
            Err(RepositoryError::Conflict(_)) => return Err(ShipmentError::AlreadyShipped),
            Err(err) => return Err(err.into()),
        };
        increment_provider_quota(&mut tx, store.id).await?;

        match tx.commit().await {
            Ok(()) => {}
            Err(err) => match RepositoryError::from_sqlx(err) {
                RepositoryError::Conflict(_) => return Err(ShipmentError::AlreadyShipped),
                other => return Err(other.into()),
            },
        }

        tracing::info!(
            shipment_id = %shipment.id,
            biteship_order_id = ?shipment.biteship_order_id,
            "shipment allocated"
        );

        Ok(shipment)
    }

    /// Fetch the provider's label URL for a shipment.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentError::NotAllocated` when the shipment has no
    /// provider order ID - a label must never be produced for an allocation
    /// that did not happen.
    #[instrument(skip(self))]
    pub async fn label_url(
        &self,
        user_id: UserId,
        store_slug: &Slug,
        shipment_id: ShipmentId,
    ) -> Result<String, ShipmentError> {
        let store = self.owned_store(user_id, store_slug).await?;

        let shipment = ShipmentRepository::new(self.pool)
            .get_for_store(shipment_id, store.id)
            .await?
            .ok_or(ShipmentError::ShipmentNotFound)?;

        let provider_order_id = shipment
            .biteship_order_id
            .as_deref()
            .ok_or(ShipmentError::NotAllocated)?;

        let provider_order = self.biteship.retrieve_order(provider_order_id).await?;

        provider_order
            .courier
            .link
            .ok_or(ShipmentError::LabelUnavailable)
    }

    /// Track a waybill and refresh the stored shipment it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentError::Provider(BiteshipError::NotFound)` when the
    /// waybill/courier pair does not resolve at the provider.
    #[instrument(skip(self))]
    pub async fn track(
        &self,
        user_id: UserId,
        store_slug: &Slug,
        waybill: &str,
        courier: &str,
    ) -> Result<TrackingView, ShipmentError> {
        let store = self.owned_store(user_id, store_slug).await?;

        let tracking = self.biteship.track(waybill, courier).await?;

        let status = ShipmentStatus::from_provider(&tracking.status);
        if status.is_none() {
            tracing::warn!(
                provider_status = %tracking.status,
                "unknown provider status in tracking response, keeping stored status"
            );
        }

        // Passive mirror: the stored row follows the provider.
        let shipment = match status {
            Some(status) => {
                ShipmentRepository::new(self.pool)
                    .update_tracking(store.id, waybill, status)
                    .await?
            }
            None => None,
        };

        Ok(TrackingView {
            waybill: waybill.to_string(),
            courier: courier.to_string(),
            status,
            provider_status: tracking.status,
            events: tracking.history,
            link: tracking.link,
            shipment,
        })
    }

    /// Quote courier rates from the store's origin to a destination.
    ///
    /// Buyer-facing: requires an existing store, not ownership.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentError::StoreNotFound` for unknown stores,
    /// `ShipmentError::ProviderNotConfigured` when the store has no active
    /// courier configuration, and a repository `NotFound` for products that
    /// are missing or inactive.
    #[instrument(skip(self, items))]
    pub async fn rates(
        &self,
        store_slug: &Slug,
        destination: &RateDestination,
        items: &[RateItem],
    ) -> Result<Vec<CourierRate>, ShipmentError> {
        let store = StoreRepository::new(self.pool)
            .find_by_slug(store_slug)
            .await?
            .ok_or(ShipmentError::StoreNotFound)?;

        let provider = StoreRepository::new(self.pool)
            .shipping_provider(store.id)
            .await?
            .filter(|p| p.active)
            .ok_or(ShipmentError::ProviderNotConfigured)?;

        let products = ProductRepository::new(self.pool);
        let mut shipment_items = Vec::with_capacity(items.len());
        for item in items {
            let product = products
                .get_active_in_store(item.product_id, store.id)
                .await?
                .ok_or(RepositoryError::NotFound)?;
            shipment_items.push(ShipmentItem {
                name: product.name,
                value: product.price.amount().to_i64().unwrap_or(0),
                quantity: item.quantity.max(1),
                weight: product.weight_grams,
            });
        }

        let request = RatesRequest {
            origin_area_id: provider.origin_area_id,
            destination_area_id: destination.area_id.clone(),
            destination_postal_code: destination.postal_code.clone(),
            couriers: QUOTED_COURIERS.to_string(),
            items: shipment_items,
        };

        let rates = self.biteship.rates(&request).await?;

        Ok(rates.as_ref().clone())
    }

    /// Resolve a store the caller owns; mismatch reads as missing.
    async fn owned_store(
        &self,
        user_id: UserId,
        store_slug: &Slug,
    ) -> Result<Store, ShipmentError> {
        StoreRepository::new(self.pool)
            .find_owned_by_slug(store_slug, user_id)
            .await?
            .ok_or(ShipmentError::StoreNotFound)
    }
}
