//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` provides a read-only feed of domain
//! events (orders placed, payments settled, stock movements) with
//! per-product subscription filtering.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
