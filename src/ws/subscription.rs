//! Per-connection subscription manager.
//!
//! Tracks which products a WebSocket client is watching and provides
//! server-side event filtering.

use std::collections::HashSet;

use crate::domain::{MarketEvent, ProductId};

/// Manages the subscription set for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Watched product IDs. If `subscribe_all` is true, this set is ignored.
    product_ids: HashSet<ProductId>,
    /// Whether the client subscribes to everything (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds product IDs to the subscription set. `"*"` enables the wildcard.
    pub fn subscribe(&mut self, ids: &[ProductId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for id in ids {
            self.product_ids.insert(*id);
        }
    }

    /// Removes product IDs from the subscription set.
    pub fn unsubscribe(&mut self, ids: &[ProductId]) {
        for id in ids {
            self.product_ids.remove(id);
        }
    }

    /// Returns `true` if the given event matches the subscription filter.
    ///
    /// Events tied to a product match that product's watchers; events with
    /// no product (orders, payments, sessions) only reach wildcard
    /// subscribers.
    #[must_use]
    pub fn matches(&self, event: &MarketEvent) -> bool {
        if self.subscribe_all {
            return true;
        }
        event
            .product_id()
            .is_some_and(|id| self.product_ids.contains(&id))
    }

    /// Returns the number of explicitly watched product IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.product_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::market_event::StockChangeReason;
    use crate::domain::{OrderId, PaymentId, UserId};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn stock_event(product_id: ProductId) -> MarketEvent {
        MarketEvent::StockAdjusted {
            product_id,
            delta: -1,
            new_quantity: 4,
            reason: StockChangeReason::CheckoutCommitted,
            timestamp: Utc::now(),
        }
    }

    fn order_event() -> MarketEvent {
        MarketEvent::OrderPlaced {
            order_id: OrderId::new(),
            buyer_id: UserId::new(),
            payment_id: PaymentId::new(),
            total_amount: Decimal::new(18000, 2),
            item_count: 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(&stock_event(ProductId::new())));
        assert!(!mgr.matches(&order_event()));
    }

    #[test]
    fn subscribe_specific_product() {
        let mut mgr = SubscriptionManager::new();
        let id = ProductId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(&stock_event(id)));
        assert!(!mgr.matches(&stock_event(ProductId::new())));
    }

    #[test]
    fn productless_events_need_wildcard() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[ProductId::new()], false);
        assert!(!mgr.matches(&order_event()));

        mgr.subscribe(&[], true);
        assert!(mgr.matches(&order_event()));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(&stock_event(ProductId::new())));
        assert!(mgr.matches(&order_event()));
    }

    #[test]
    fn unsubscribe_removes_product() {
        let mut mgr = SubscriptionManager::new();
        let id = ProductId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(&stock_event(id)));
        mgr.unsubscribe(&[id]);
        assert!(!mgr.matches(&stock_event(id)));
    }

    #[test]
    fn count_tracks_explicit() {
        let mut mgr = SubscriptionManager::new();
        assert_eq!(mgr.count(), 0);
        mgr.subscribe(&[ProductId::new(), ProductId::new()], false);
        assert_eq!(mgr.count(), 2);
    }
}
