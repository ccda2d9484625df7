//! Business services sitting between the route handlers and the
//! repositories.
//!
//! Handlers stay thin: they parse the request, call one service method, and
//! convert the result. Ownership guards, state-machine checks, and the
//! provider orchestration all live here.

pub mod cart;
pub mod checkout;
pub mod shipment;

pub use cart::CartService;
pub use checkout::CheckoutService;
pub use shipment::ShipmentService;
