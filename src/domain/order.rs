//! Orders and order items, with the order status state machine.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{OrderId, ProductId, UserId};

/// Lifecycle status of an order.
///
/// Legal transitions: `Pending`/`Unpaid` → `Paid` (payment confirmed) or
/// `Pending`/`Unpaid` → `Cancelled`. `Paid` and `Cancelled` are terminal.
/// New orders are written as [`OrderStatus::Unpaid`]; `pending` is accepted
/// on read for rows predating this service and treated identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting payment (legacy spelling).
    Pending,
    /// Awaiting payment.
    Unpaid,
    /// Payment confirmed; stock committed at checkout stays committed.
    Paid,
    /// Cancelled before payment; stock has been restored.
    Cancelled,
}

impl OrderStatus {
    /// Returns the database string for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether an order in this status may still be cancelled.
    #[must_use]
    pub const fn cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Unpaid)
    }

    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }
}

/// Error returned when a status string stored in the database is unknown.
#[derive(Debug, thiserror::Error)]
#[error("unknown status value: {0}")]
pub struct UnknownStatus(pub String);

impl From<UnknownStatus> for crate::error::MarketError {
    fn from(err: UnknownStatus) -> Self {
        // A status this service did not write is a data defect, not caller input.
        Self::Internal(err.to_string())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// An order: the immutable result of a checkout.
///
/// Only `status` ever changes after insertion.
#[derive(Debug, Clone)]
pub struct Order {
    /// Order identifier.
    pub id: OrderId,
    /// Buyer the order belongs to.
    pub buyer_id: UserId,
    /// Delivery address captured at checkout.
    pub delivery_address: String,
    /// Cart amount plus courier cost.
    pub total_amount: Decimal,
    /// Courier cost component.
    pub courier_cost: Decimal,
    /// When the order was created.
    pub order_date: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: OrderStatus,
}

/// A frozen copy of one cart line at checkout time. Never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    /// Owning order.
    pub order_id: OrderId,
    /// Product sold.
    pub product_id: ProductId,
    /// Units sold; exactly what checkout decremented from stock.
    pub quantity: i32,
    /// Unit price frozen from the cart line's `price_at_add`.
    pub price_at_order: Decimal,
}

impl OrderItem {
    /// Returns `price_at_order × quantity` for this item.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price_at_order * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Unpaid,
            OrderStatus::Paid,
            OrderStatus::Cancelled,
        ] {
            let parsed = OrderStatus::from_str(status.as_str()).ok();
            assert_eq!(parsed, Some(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(OrderStatus::from_str("shipped").is_err());
    }

    #[test]
    fn only_open_orders_are_cancellable() {
        assert!(OrderStatus::Pending.cancellable());
        assert!(OrderStatus::Unpaid.cancellable());
        assert!(!OrderStatus::Paid.cancellable());
        assert!(!OrderStatus::Cancelled.cancellable());
    }

    #[test]
    fn paid_and_cancelled_are_terminal() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Unpaid.is_terminal());
    }

    #[test]
    fn item_line_total() {
        let item = OrderItem {
            order_id: OrderId::new(),
            product_id: ProductId::new(),
            quantity: 2,
            price_at_order: Decimal::new(7500, 2),
        };
        assert_eq!(item.line_total(), Decimal::new(15000, 2));
    }
}
