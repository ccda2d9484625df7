//! Shared type definitions.

pub mod email;
pub mod id;
pub mod money;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use slug::{Slug, SlugError};
pub use status::{OrderStatus, PaymentStatus, ShipmentStatus, TransitionError};
