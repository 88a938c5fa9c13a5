//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::{CartService, OrderService, SessionGuard};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Cart operations.
    pub cart_service: Arc<CartService>,
    /// Checkout, payment settlement, and order history.
    pub order_service: Arc<OrderService>,
    /// Login, session validation, logout.
    pub session_guard: Arc<SessionGuard>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}
