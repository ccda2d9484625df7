//! Biteship REST API client.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::types::{
    BiteshipOrder, CourierRate, CreateOrderRequest, RatesRequest, RatesResponse, Tracking,
};
use super::BiteshipError;
use crate::config::BiteshipConfig;

/// Timeout for every provider call. A hanging provider otherwise blocks the
/// handling request for its full duration.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a rate quote stays valid in the cache.
const RATES_CACHE_TTL: Duration = Duration::from_secs(60);

/// Maximum number of cached rate quotes.
const RATES_CACHE_CAPACITY: u64 = 1_000;

/// Biteship API client.
///
/// Cheaply cloneable; one instance lives in the application state.
#[derive(Clone)]
pub struct BiteshipClient {
    inner: Arc<BiteshipClientInner>,
}

struct BiteshipClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    /// Storefront checkouts re-request the same quote aggressively; cache
    /// them briefly, keyed by the serialized request.
    rates_cache: Cache<String, Arc<Vec<CourierRate>>>,
}

/// Error body shape used by the Biteship API.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl BiteshipClient {
    /// Create a new API client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: &BiteshipConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            inner: Arc::new(BiteshipClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                api_key: config.api_key.clone(),
                rates_cache: Cache::builder()
                    .max_capacity(RATES_CACHE_CAPACITY)
                    .time_to_live(RATES_CACHE_TTL)
                    .build(),
            }),
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Allocate a shipment order at the provider.
    ///
    /// # Errors
    ///
    /// Returns `BiteshipError::Api` if the provider rejects the order.
    /// Returns `BiteshipError::Http` on network failures.
    #[instrument(skip(self, request), fields(reference_id = %request.reference_id))]
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<BiteshipOrder, BiteshipError> {
        self.post("/v1/orders", request).await
    }

    /// Fetch a previously created order by its provider-issued ID.
    ///
    /// # Errors
    ///
    /// Returns `BiteshipError::NotFound` if the ID is unknown to the provider.
    /// Returns `BiteshipError::Http` on network failures.
    #[instrument(skip(self))]
    pub async fn retrieve_order(&self, order_id: &str) -> Result<BiteshipOrder, BiteshipError> {
        self.get(&format!("/v1/orders/{order_id}")).await
    }

    /// Quote courier rates for a package, with short-lived caching.
    ///
    /// # Errors
    ///
    /// Returns `BiteshipError::Api` if the provider cannot quote the route.
    /// Returns `BiteshipError::Http` on network failures.
    #[instrument(skip(self, request))]
    pub async fn rates(&self, request: &RatesRequest) -> Result<Arc<Vec<CourierRate>>, BiteshipError> {
        let key = serde_json::to_string(request)
            .unwrap_or_else(|_| format!("{}:{}", request.origin_area_id, request.couriers));

        if let Some(hit) = self.inner.rates_cache.get(&key).await {
            return Ok(hit);
        }

        let response: RatesResponse = self.post("/v1/rates/couriers", request).await?;
        let rates = Arc::new(response.pricing);
        self.inner.rates_cache.insert(key, Arc::clone(&rates)).await;

        Ok(rates)
    }

    /// Track a shipment by waybill and courier code.
    ///
    /// # Errors
    ///
    /// Returns `BiteshipError::NotFound` if waybill/courier do not resolve.
    /// Returns `BiteshipError::Http` on network failures.
    #[instrument(skip(self))]
    pub async fn track(&self, waybill: &str, courier: &str) -> Result<Tracking, BiteshipError> {
        self.get(&format!("/v1/trackings/{waybill}/couriers/{courier}"))
            .await
    }

    // =========================================================================
    // HTTP plumbing
    // =========================================================================

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BiteshipError> {
        let response = self
            .inner
            .client
            .get(format!("{}{path}", self.inner.base_url))
            .header("Authorization", self.inner.api_key.expose_secret())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BiteshipError> {
        let response = self
            .inner
            .client
            .post(format!("{}{path}", self.inner.base_url))
            .header("Authorization", self.inner.api_key.expose_secret())
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BiteshipError> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BiteshipError::NotFound(
                "resource not found at provider".to_string(),
            ));
        }

        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.or(body.message))
                .unwrap_or_else(|| "unknown provider error".to_string());

            return Err(BiteshipError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}
