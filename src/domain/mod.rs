//! Domain layer: core types, state machines, and the event system.
//!
//! This module contains the marketplace domain model: typed identifiers,
//! the product/cart/order/payment entities with their status state machines
//! and pure transition guards, session identity, and the event bus for
//! broadcasting committed state changes.

pub mod cart;
pub mod event_bus;
pub mod ids;
pub mod market_event;
pub mod order;
pub mod payment;
pub mod product;
pub mod session;

pub use cart::CartLine;
pub use event_bus::EventBus;
pub use ids::{OrderId, PaymentId, ProductId, SessionId, UserId};
pub use market_event::{MarketEvent, StockChangeReason};
pub use order::{Order, OrderItem, OrderStatus};
pub use payment::{Payment, PaymentLifecycle, PaymentStatus};
pub use product::Product;
pub use session::{Role, SessionContext, SessionRecord};
