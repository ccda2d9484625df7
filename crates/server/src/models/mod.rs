//! Domain models for the API.
//!
//! These are the in-memory shapes the services and routes work with. The
//! `db` module owns the mapping between these and the relational rows.

pub mod cart;
pub mod order;
pub mod product;
pub mod shipment;
pub mod store;
pub mod user;

pub use cart::{Cart, CartItem, CartLine, CartView};
pub use order::{Order, Payment, RecipientInfo};
pub use product::Product;
pub use shipment::Shipment;
pub use store::{ShippingProviderConfig, Store};
pub use user::User;

use serde::{Deserialize, Serialize};

use kebuncuan_core::{Email, UserId};

/// Session storage keys.
///
/// The external auth layer writes the current user under these keys; this
/// service only ever reads them.
pub mod session_keys {
    /// Key for the authenticated user.
    pub const CURRENT_USER: &str = "current_user";
}

/// The authenticated user as stored in the session by the auth layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account ID.
    pub id: UserId,
    /// Account email, used for merchant ownership checks.
    pub email: Email,
}
