//! Service layer: one database transaction per operation.
//!
//! Services orchestrate the persistence functions into atomic sequences,
//! emit domain events after commit, and log every state mutation.

pub mod cart_service;
pub mod order_service;
pub mod session_guard;

pub use cart_service::{CartLineView, CartService, CartUpdate, CartView};
pub use order_service::{CancellationReceipt, CheckoutReceipt, OrderDetail, OrderService};
pub use session_guard::SessionGuard;
