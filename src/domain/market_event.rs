//! Domain events reflecting committed state mutations.
//!
//! Every service operation that commits a transaction publishes a
//! [`MarketEvent`] through the [`super::EventBus`] after the commit. Events
//! are broadcast to WebSocket subscribers (ops dashboards, stock watchers).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::session::Role;
use super::{OrderId, PaymentId, ProductId, UserId};

/// Why a product's stock counter moved.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockChangeReason {
    /// Checkout committed the decrement.
    CheckoutCommitted,
    /// A cancelled payment restored the units.
    CancellationRestored,
}

/// Domain event emitted after a committed mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A checkout created an order with its payment record.
    OrderPlaced {
        /// New order.
        order_id: OrderId,
        /// Buyer who checked out.
        buyer_id: UserId,
        /// Payment awaiting proof of payment.
        payment_id: PaymentId,
        /// Order total including courier cost.
        total_amount: Decimal,
        /// Number of distinct order items.
        item_count: usize,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Proof of payment was accepted.
    PaymentConfirmed {
        /// Settled payment.
        payment_id: PaymentId,
        /// Order now marked paid.
        order_id: OrderId,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A pending payment was cancelled; its order's stock was restored.
    PaymentCancelled {
        /// Cancelled payment.
        payment_id: PaymentId,
        /// Order now marked cancelled.
        order_id: OrderId,
        /// Buyer who cancelled.
        buyer_id: UserId,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A product's stock counter moved.
    StockAdjusted {
        /// Product whose counter moved.
        product_id: ProductId,
        /// Signed change: negative for a sale, positive for a restore.
        delta: i32,
        /// Counter value after the change.
        new_quantity: i32,
        /// What caused the change.
        reason: StockChangeReason,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A login opened a new session, invalidating any prior one.
    SessionOpened {
        /// Account that logged in.
        user_id: UserId,
        /// Role the account logged in under.
        role: Role,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl MarketEvent {
    /// Returns the product this event concerns, if any.
    ///
    /// Used for WebSocket subscription filtering; events without a product
    /// are only delivered to wildcard subscribers.
    #[must_use]
    pub const fn product_id(&self) -> Option<ProductId> {
        match self {
            Self::StockAdjusted { product_id, .. } => Some(*product_id),
            _ => None,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::OrderPlaced { .. } => "order_placed",
            Self::PaymentConfirmed { .. } => "payment_confirmed",
            Self::PaymentCancelled { .. } => "payment_cancelled",
            Self::StockAdjusted { .. } => "stock_adjusted",
            Self::SessionOpened { .. } => "session_opened",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn event_type_strings() {
        let event = MarketEvent::PaymentConfirmed {
            payment_id: PaymentId::new(),
            order_id: OrderId::new(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "payment_confirmed");
    }

    #[test]
    fn stock_adjusted_serializes_with_reason() {
        let event = MarketEvent::StockAdjusted {
            product_id: ProductId::new(),
            delta: -3,
            new_quantity: 2,
            reason: StockChangeReason::CheckoutCommitted,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("stock_adjusted"));
        assert!(json.contains("checkout_committed"));
        assert!(json.contains("-3"));
    }

    #[test]
    fn product_accessor_only_for_stock_events() {
        let id = ProductId::new();
        let stock = MarketEvent::StockAdjusted {
            product_id: id,
            delta: 1,
            new_quantity: 6,
            reason: StockChangeReason::CancellationRestored,
            timestamp: Utc::now(),
        };
        assert_eq!(stock.product_id(), Some(id));

        let order = MarketEvent::OrderPlaced {
            order_id: OrderId::new(),
            buyer_id: UserId::new(),
            payment_id: PaymentId::new(),
            total_amount: Decimal::new(18000, 2),
            item_count: 2,
            timestamp: Utc::now(),
        };
        assert_eq!(order.product_id(), None);
    }
}
