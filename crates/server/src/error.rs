//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; responses are JSON `{ "error": string }` bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use kebuncuan_core::TransitionError;

use crate::biteship::BiteshipError;
use crate::db::RepositoryError;
use crate::services::cart::CartError;
use crate::services::checkout::CheckoutError;
use crate::services::shipment::ShipmentError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Courier aggregator operation failed.
    #[error("Courier provider error: {0}")]
    Provider(#[from] BiteshipError),

    /// Shipping is not configured for the store.
    #[error("Shipping provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// Resource not found (or not owned by the caller).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// State conflict (duplicate shipment, illegal status transition).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Provider(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Provider(err) => match err {
                BiteshipError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ProviderNotConfigured(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "not found".to_string(),
                RepositoryError::Conflict(msg) => msg.clone(),
                _ => "internal server error".to_string(),
            },
            Self::Provider(err) => match err {
                BiteshipError::NotFound(msg) => msg.clone(),
                _ => "courier provider request failed".to_string(),
            },
            Self::Internal(_) => "internal server error".to_string(),
            Self::ProviderNotConfigured(msg)
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        Self::Conflict(err.to_string())
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::StoreNotFound => Self::NotFound("store not found".to_string()),
            CartError::ProductUnavailable => Self::NotFound("product not found".to_string()),
            CartError::ItemNotFound => Self::NotFound("cart item not found".to_string()),
            CartError::InvalidQuantity => {
                Self::BadRequest("quantity must be at least 1".to_string())
            }
            CartError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::StoreNotFound => Self::NotFound("store not found".to_string()),
            CheckoutError::ProductUnavailable => Self::NotFound("product not found".to_string()),
            CheckoutError::EmptyCart => Self::BadRequest("cart is empty".to_string()),
            CheckoutError::InvalidQuantity => {
                Self::BadRequest("quantity must be at least 1".to_string())
            }
            CheckoutError::MissingField(field) => {
                Self::BadRequest(format!("missing required field: {field}"))
            }
            CheckoutError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<ShipmentError> for AppError {
    fn from(err: ShipmentError) -> Self {
        match err {
            ShipmentError::StoreNotFound => Self::NotFound("store not found".to_string()),
            ShipmentError::OrderNotFound => Self::NotFound("order not found".to_string()),
            ShipmentError::ShipmentNotFound => Self::NotFound("shipment not found".to_string()),
            ShipmentError::ShippingNotRequired => {
                Self::BadRequest("order does not require shipping".to_string())
            }
            ShipmentError::NoCourierSelected => {
                Self::BadRequest("order has no courier selected".to_string())
            }
            ShipmentError::PaymentNotSettled => {
                Self::BadRequest("order payment is not settled".to_string())
            }
            ShipmentError::AlreadyShipped => {
                Self::Conflict("a shipment already exists for this order".to_string())
            }
            ShipmentError::NotAllocated => {
                Self::BadRequest("shipment was never allocated at the provider".to_string())
            }
            ShipmentError::LabelUnavailable => {
                Self::NotFound("label not available yet".to_string())
            }
            ShipmentError::QuotaExhausted => {
                Self::BadRequest("shipment quota exhausted for this store".to_string())
            }
            ShipmentError::ProviderNotConfigured => Self::ProviderNotConfigured(
                "shipping is not configured or not active for this store".to_string(),
            ),
            ShipmentError::Provider(e) => Self::Provider(e),
            ShipmentError::Repository(e) => Self::Database(e),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order 123".to_string());
        assert_eq!(err.to_string(), "Not found: order 123");

        let err = AppError::Conflict("a shipment already exists".to_string());
        assert_eq!(err.to_string(), "Conflict: a shipment already exists");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "duplicate".to_string()
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_illegal_transition_maps_to_conflict() {
        use kebuncuan_core::OrderStatus;

        let transition_err = OrderStatus::Cancelled
            .transition(OrderStatus::Paid)
            .expect_err("cancelled orders cannot be re-paid");
        let err = AppError::from(transition_err);
        assert_eq!(get_status(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_duplicate_shipment_maps_to_conflict() {
        let err = AppError::from(ShipmentError::AlreadyShipped);
        assert_eq!(get_status(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_provider_failure_maps_to_bad_gateway() {
        let err = AppError::from(ShipmentError::Provider(BiteshipError::Api {
            status: 500,
            message: "upstream exploded".to_string(),
        }));
        assert_eq!(get_status(err), StatusCode::BAD_GATEWAY);
    }
}
