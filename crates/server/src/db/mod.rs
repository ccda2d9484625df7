//! Database operations for `PostgreSQL`.
//!
//! # Tables
//!
//! - `app_user` - Buyer and merchant accounts
//! - `store` / `shipping_provider` - Tenants and their courier configuration
//! - `category` / `product` - Catalog
//! - `cart` / `cart_item` - Per-(buyer, store) carts
//! - `orders` / `payment` - Checkout results
//! - `shipment` - Courier allocations (one per order)
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p kebuncuan-cli -- migrate
//! ```

pub mod carts;
pub mod orders;
pub mod products;
pub mod shipments;
pub mod stores;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use orders::{NewOrder, OrderRepository};
pub use products::ProductRepository;
pub use shipments::{NewShipment, ShipmentRepository};
pub use stores::StoreRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation or serialization failure.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// `PostgreSQL` SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// `PostgreSQL` SQLSTATE for serializable transaction conflicts.
const SERIALIZATION_FAILURE: &str = "40001";

impl RepositoryError {
    /// Convert an sqlx error, folding constraint violations and
    /// serialization failures into [`RepositoryError::Conflict`].
    ///
    /// The shipment service relies on this: a concurrent duplicate insert
    /// must surface as a conflict, not a 500.
    #[must_use]
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return Self::Conflict(format!(
                        "unique constraint violated: {}",
                        db.constraint().unwrap_or("unknown")
                    ));
                }
                Some(SERIALIZATION_FAILURE) => {
                    return Self::Conflict("concurrent transaction conflict".to_string());
                }
                _ => {}
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
