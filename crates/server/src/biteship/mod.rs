//! Biteship courier aggregator API client.
//!
//! Thin typed access to the subset of the Biteship REST API this platform
//! consumes: order creation, order retrieval (for labels), courier rate
//! quotes, and waybill tracking.
//!
//! # Authentication
//!
//! One platform-wide API key from the environment; tenants share the
//! provider account. The key travels in the `Authorization` header on every
//! request.

pub mod client;
pub mod types;

pub use client::BiteshipClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Biteship API.
#[derive(Debug, Error)]
pub enum BiteshipError {
    /// HTTP request failed (network, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Error message from the response body, if any.
        message: String,
    },

    /// Resource not found (unknown order ID, unresolvable waybill).
    #[error("Not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BiteshipError::NotFound("waybill JNE123".to_string());
        assert_eq!(err.to_string(), "Not found: waybill JNE123");

        let err = BiteshipError::Api {
            status: 422,
            message: "courier not serviceable".to_string(),
        };
        assert_eq!(err.to_string(), "API error (422): courier not serviceable");
    }
}
