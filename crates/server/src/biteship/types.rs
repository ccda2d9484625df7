//! Request and response payloads for the Biteship API.
//!
//! Only the fields this platform reads are modeled; everything else in the
//! provider's responses is ignored during deserialization.

use serde::{Deserialize, Serialize};

// =============================================================================
// Order creation / retrieval
// =============================================================================

/// A package line sent with orders and rate requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentItem {
    pub name: String,
    /// Declared value in whole rupiah.
    pub value: i64,
    pub quantity: i32,
    /// Weight in grams.
    pub weight: i32,
}

/// Payload for `POST /v1/orders`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub origin_contact_name: String,
    pub origin_contact_phone: String,
    pub origin_address: String,
    pub origin_area_id: String,
    pub destination_contact_name: String,
    pub destination_contact_phone: String,
    pub destination_address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub destination_area_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub destination_postal_code: String,
    pub courier_company: String,
    pub courier_type: String,
    pub delivery_type: String,
    /// Idempotency handle: the platform's order invoice. A duplicate
    /// allocation attempt is visible provider-side under the same reference.
    pub reference_id: String,
    pub items: Vec<ShipmentItem>,
}

/// Courier block embedded in order responses.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCourier {
    pub company: String,
    #[serde(rename = "type")]
    pub courier_type: String,
    /// Assigned once the courier schedules pickup.
    #[serde(default)]
    pub waybill_id: Option<String>,
    /// Label / tracking page for the allocation.
    #[serde(default)]
    pub link: Option<String>,
}

/// Response of `POST /v1/orders` and `GET /v1/orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BiteshipOrder {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub price: i64,
    pub courier: OrderCourier,
    #[serde(default)]
    pub reference_id: Option<String>,
}

// =============================================================================
// Rates
// =============================================================================

/// Payload for `POST /v1/rates/couriers`.
#[derive(Debug, Clone, Serialize)]
pub struct RatesRequest {
    pub origin_area_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub destination_area_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub destination_postal_code: String,
    /// Comma-separated courier codes, e.g. `"jne,sicepat,anteraja"`.
    pub couriers: String,
    pub items: Vec<ShipmentItem>,
}

/// One quoted shipping method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierRate {
    pub courier_name: String,
    pub courier_code: String,
    pub courier_service_name: String,
    pub courier_service_code: String,
    pub price: i64,
    /// Human-readable delivery window, e.g. `"1 - 2 days"`.
    #[serde(default)]
    pub duration: String,
}

/// Response of `POST /v1/rates/couriers`.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesResponse {
    #[serde(default)]
    pub pricing: Vec<CourierRate>,
}

// =============================================================================
// Tracking
// =============================================================================

/// One tracking history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    #[serde(default)]
    pub note: String,
    pub status: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Response of `GET /v1/trackings/{waybill}/couriers/{courier}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Tracking {
    pub status: String,
    #[serde(default)]
    pub waybill_id: Option<String>,
    #[serde(default)]
    pub history: Vec<TrackingEvent>,
    /// Public tracking page.
    #[serde(default)]
    pub link: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_request_shape() {
        let request = CreateOrderRequest {
            origin_contact_name: "Toko Sayur".to_string(),
            origin_contact_phone: "+6281200000001".to_string(),
            origin_address: "Jl. Kebun Raya 1, Bogor".to_string(),
            origin_area_id: "IDNP6IDNC148".to_string(),
            destination_contact_name: "Budi".to_string(),
            destination_contact_phone: "+6281200000002".to_string(),
            destination_address: "Jl. Melati 2, Depok".to_string(),
            destination_area_id: "IDNP6IDNC149".to_string(),
            destination_postal_code: String::new(),
            courier_company: "jne".to_string(),
            courier_type: "reg".to_string(),
            delivery_type: "now".to_string(),
            reference_id: "KC-20260715-A1B2C3".to_string(),
            items: vec![ShipmentItem {
                name: "Pupuk Organik".to_string(),
                value: 50_000,
                quantity: 2,
                weight: 1000,
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["courier_company"], "jne");
        assert_eq!(json["reference_id"], "KC-20260715-A1B2C3");
        assert_eq!(json["items"][0]["weight"], 1000);
        // Empty destination fields are omitted entirely
        assert!(json.get("destination_postal_code").is_none());
    }

    #[test]
    fn test_order_response_parse() {
        let body = r#"{
            "success": true,
            "id": "5dd599ebdefcd4158eb8470b",
            "status": "confirmed",
            "price": 15000,
            "reference_id": "KC-20260715-A1B2C3",
            "courier": {
                "company": "jne",
                "type": "reg",
                "waybill_id": null,
                "link": null
            }
        }"#;

        let order: BiteshipOrder = serde_json::from_str(body).unwrap();
        assert_eq!(order.id, "5dd599ebdefcd4158eb8470b");
        assert_eq!(order.status, "confirmed");
        assert_eq!(order.price, 15_000);
        assert_eq!(order.courier.company, "jne");
        assert!(order.courier.waybill_id.is_none());
    }

    #[test]
    fn test_rates_response_parse() {
        let body = r#"{
            "success": true,
            "origin": {},
            "destination": {},
            "pricing": [{
                "courier_name": "JNE",
                "courier_code": "jne",
                "courier_service_name": "Reguler",
                "courier_service_code": "reg",
                "price": 15000,
                "duration": "1 - 2 days"
            }]
        }"#;

        let rates: RatesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(rates.pricing.len(), 1);
        let rate = rates.pricing.first().unwrap();
        assert_eq!(rate.price, 15_000);
        assert_eq!(rate.courier_service_code, "reg");
    }

    #[test]
    fn test_tracking_response_parse() {
        let body = r#"{
            "success": true,
            "status": "dropping_off",
            "waybill_id": "JNE1234567890",
            "link": "https://track.biteship.com/JNE1234567890",
            "history": [
                {"note": "Picked up", "status": "picked", "updated_at": "2026-07-15T08:00:00+07:00"},
                {"note": "In transit", "status": "dropping_off", "updated_at": "2026-07-15T12:00:00+07:00"}
            ]
        }"#;

        let tracking: Tracking = serde_json::from_str(body).unwrap();
        assert_eq!(tracking.status, "dropping_off");
        assert_eq!(tracking.history.len(), 2);
        assert_eq!(tracking.history.first().unwrap().status, "picked");
    }
}
