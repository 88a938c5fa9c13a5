//! Order/payment engine: checkout, payment settlement, cancellation, and
//! order history reads.
//!
//! Every mutation is one database transaction. Checkout re-validates each
//! cart line under its product's row lock before any stock is decremented,
//! then commits stock, order, items, payment, and the cart delete as one
//! unit. Cancellation flips the payment and order state machines and
//! restores stock in the same commit, exactly once.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::cart::cart_total;
use crate::domain::session::Role;
use crate::domain::{
    CartLine, EventBus, MarketEvent, Order, OrderId, OrderItem, OrderStatus, Payment, PaymentId,
    PaymentLifecycle, PaymentStatus, ProductId, SessionContext, StockChangeReason,
};
use crate::error::MarketError;
use crate::persistence::{cart_store, catalog, order_store, payment_store};

/// What a successful checkout hands back to the buyer.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutReceipt {
    /// The new order.
    pub order_id: OrderId,
    /// The payment awaiting proof of payment.
    pub payment_id: PaymentId,
    /// Order total including courier cost.
    pub total_amount: Decimal,
}

/// What a successful cancellation hands back.
#[derive(Debug, Clone, Copy)]
pub struct CancellationReceipt {
    /// The cancelled payment.
    pub payment_id: PaymentId,
    /// The cancelled order.
    pub order_id: OrderId,
    /// Number of distinct products whose stock was restored.
    pub restored_items: usize,
}

/// An order together with its frozen items.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    /// The order row.
    pub order: Order,
    /// Its items, ordered by product id.
    pub items: Vec<OrderItem>,
}

/// Validates checkout input before any transaction opens.
///
/// # Errors
///
/// Returns [`MarketError::InvalidInput`] for an empty address or negative
/// courier cost.
fn validate_checkout_input<'a>(
    delivery_address: &'a str,
    courier_cost: Decimal,
) -> Result<&'a str, MarketError> {
    let address = delivery_address.trim();
    if address.is_empty() {
        return Err(MarketError::InvalidInput(
            "delivery address must not be empty".to_string(),
        ));
    }
    if courier_cost < Decimal::ZERO {
        return Err(MarketError::InvalidInput(
            "courier cost must not be negative".to_string(),
        ));
    }
    Ok(address)
}

/// Freezes cart lines into order items.
///
/// Quantities and prices carry over untouched: the items record exactly
/// what checkout decrements from stock, which is what cancellation later
/// restores.
fn freeze_lines(order_id: OrderId, lines: &[CartLine]) -> Vec<OrderItem> {
    lines
        .iter()
        .map(|line| OrderItem {
            order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            price_at_order: line.price_at_add,
        })
        .collect()
}

/// Orchestrates the order and payment state machines.
#[derive(Debug, Clone)]
pub struct OrderService {
    pool: PgPool,
    event_bus: EventBus,
}

impl OrderService {
    /// Creates a new `OrderService`.
    #[must_use]
    pub fn new(pool: PgPool, event_bus: EventBus) -> Self {
        Self { pool, event_bus }
    }

    /// Converts the buyer's cart into an order, its items, and a pending
    /// payment, committing stock in the same transaction.
    ///
    /// Products are locked in sorted-id order (the order the cart store
    /// returns lines in). Validation of every line happens before the
    /// first decrement; any stale line aborts the whole checkout with
    /// nothing written. This is the only point in the system where stock
    /// is decremented.
    ///
    /// # Errors
    ///
    /// [`MarketError::InvalidInput`] for bad address/courier input,
    /// [`MarketError::EmptyCart`] when there is nothing to check out,
    /// [`MarketError::InsufficientStock`] naming the first line that no
    /// longer fits live stock, [`MarketError::ProductNotFound`] if a lined
    /// product vanished, or [`MarketError::Database`] on failure.
    pub async fn checkout(
        &self,
        ctx: &SessionContext,
        delivery_address: &str,
        courier_cost: Decimal,
    ) -> Result<CheckoutReceipt, MarketError> {
        let buyer = ctx.require_buyer()?;
        let address = validate_checkout_input(delivery_address, courier_cost)?;

        let mut tx = self.pool.begin().await?;

        let lines = cart_store::lines_for_buyer(&mut tx, buyer).await?;
        if lines.is_empty() {
            return Err(MarketError::EmptyCart);
        }

        // Every line must fit live stock before anything is decremented.
        for line in &lines {
            let product = catalog::get_product_for_update(&mut tx, line.product_id)
                .await?
                .ok_or(MarketError::ProductNotFound(*line.product_id.as_uuid()))?;
            product.ensure_available(line.quantity)?;
        }

        let mut stock_changes: Vec<(ProductId, i32, i32)> = Vec::with_capacity(lines.len());
        for line in &lines {
            let new_quantity =
                catalog::decrement_stock(&mut tx, line.product_id, line.quantity).await?;
            stock_changes.push((line.product_id, line.quantity, new_quantity));
        }

        let cart_amount = cart_total(&lines);
        let total_amount = cart_amount + courier_cost;
        let now = Utc::now();

        let order = Order {
            id: OrderId::new(),
            buyer_id: buyer,
            delivery_address: address.to_string(),
            total_amount,
            courier_cost,
            order_date: now,
            status: OrderStatus::Unpaid,
        };
        order_store::insert_order(&mut tx, &order).await?;

        let items = freeze_lines(order.id, &lines);
        order_store::insert_items(&mut tx, &items).await?;

        let payment = Payment {
            id: PaymentId::new(),
            order_id: order.id,
            buyer_id: buyer,
            cart_amount,
            courier_cost,
            total_amount,
            payment_status: PaymentStatus::Pending,
            status: PaymentLifecycle::Open,
            pop_reference: None,
            created_at: now,
            updated_at: now,
        };
        payment_store::insert_payment(&mut tx, &payment).await?;

        cart_store::clear_cart(&mut tx, buyer).await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            payment_id = %payment.id,
            %buyer,
            %total_amount,
            items = items.len(),
            "checkout committed"
        );

        let _ = self.event_bus.publish(MarketEvent::OrderPlaced {
            order_id: order.id,
            buyer_id: buyer,
            payment_id: payment.id,
            total_amount,
            item_count: items.len(),
            timestamp: Utc::now(),
        });
        for (product_id, quantity, new_quantity) in stock_changes {
            let _ = self.event_bus.publish(MarketEvent::StockAdjusted {
                product_id,
                delta: -quantity,
                new_quantity,
                reason: StockChangeReason::CheckoutCommitted,
                timestamp: Utc::now(),
            });
        }

        Ok(CheckoutReceipt {
            order_id: order.id,
            payment_id: payment.id,
            total_amount,
        })
    }

    /// Accepts a proof-of-payment reference and settles the payment.
    ///
    /// Only legal while the payment is pending; a second confirmation is
    /// rejected. Stock is untouched (it was committed at checkout).
    ///
    /// # Errors
    ///
    /// [`MarketError::Forbidden`] unless the caller is an admin,
    /// [`MarketError::InvalidInput`] for an empty reference,
    /// [`MarketError::PaymentNotFound`] for an unknown id,
    /// [`MarketError::PaymentNotPending`] when already settled, or
    /// [`MarketError::Database`] on failure.
    pub async fn confirm_payment(
        &self,
        ctx: &SessionContext,
        payment_id: PaymentId,
        pop_reference: &str,
    ) -> Result<Payment, MarketError> {
        ctx.require_admin()?;
        let reference = pop_reference.trim();
        if reference.is_empty() {
            return Err(MarketError::InvalidInput(
                "proof-of-payment reference must not be empty".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let mut payment = payment_store::get_payment_for_update(&mut tx, payment_id)
            .await?
            .ok_or(MarketError::PaymentNotFound(*payment_id.as_uuid()))?;
        payment.ensure_confirmable()?;

        payment_store::mark_successful(&mut tx, payment_id, reference).await?;
        let order_rows = order_store::mark_paid(&mut tx, payment.order_id).await?;
        if order_rows == 0 {
            return Err(MarketError::Internal(format!(
                "order {} was not open while its payment was pending",
                payment.order_id
            )));
        }

        tx.commit().await?;

        tracing::info!(%payment_id, order_id = %payment.order_id, "payment confirmed");

        let _ = self.event_bus.publish(MarketEvent::PaymentConfirmed {
            payment_id,
            order_id: payment.order_id,
            timestamp: Utc::now(),
        });

        payment.payment_status = PaymentStatus::Successful;
        payment.status = PaymentLifecycle::Complete;
        payment.pop_reference = Some(reference.to_string());
        payment.updated_at = Utc::now();
        Ok(payment)
    }

    /// Cancels a pending payment owned by the caller, cancelling its order
    /// and restoring every order item's quantity to product stock.
    ///
    /// The payment row lock plus the pending-only transition make the
    /// restore exactly-once: a payment that has left `Pending` can never be
    /// cancelled again, so the increments cannot double-fire.
    ///
    /// # Errors
    ///
    /// [`MarketError::InvalidCancellation`] when the payment is unknown,
    /// not owned by the caller, or not pending (nothing is written), or
    /// [`MarketError::Database`] on failure.
    pub async fn cancel_payment(
        &self,
        ctx: &SessionContext,
        payment_id: PaymentId,
    ) -> Result<CancellationReceipt, MarketError> {
        let buyer = ctx.require_buyer()?;

        let mut tx = self.pool.begin().await?;

        // Unknown, foreign, and settled payments all collapse into the
        // same error so existence is not leaked to non-owners.
        let payment = payment_store::get_payment_for_update(&mut tx, payment_id)
            .await?
            .ok_or(MarketError::InvalidCancellation)?;
        payment.ensure_cancellable_by(buyer)?;

        payment_store::mark_failed(&mut tx, payment_id).await?;

        let order_rows = order_store::mark_cancelled(&mut tx, payment.order_id).await?;
        if order_rows == 0 {
            tracing::warn!(
                %payment_id,
                order_id = %payment.order_id,
                "pending payment points at a settled order; refusing cancellation"
            );
            return Err(MarketError::InvalidCancellation);
        }

        let items = order_store::items_for_order(&mut tx, payment.order_id).await?;
        let mut restored: Vec<(ProductId, i32, i32)> = Vec::with_capacity(items.len());
        for item in &items {
            let new_quantity =
                catalog::increment_stock(&mut tx, item.product_id, item.quantity).await?;
            restored.push((item.product_id, item.quantity, new_quantity));
        }

        tx.commit().await?;

        tracing::info!(
            %payment_id,
            order_id = %payment.order_id,
            %buyer,
            restored = items.len(),
            "payment cancelled, stock restored"
        );

        let _ = self.event_bus.publish(MarketEvent::PaymentCancelled {
            payment_id,
            order_id: payment.order_id,
            buyer_id: buyer,
            timestamp: Utc::now(),
        });
        for (product_id, quantity, new_quantity) in restored {
            let _ = self.event_bus.publish(MarketEvent::StockAdjusted {
                product_id,
                delta: quantity,
                new_quantity,
                reason: StockChangeReason::CancellationRestored,
                timestamp: Utc::now(),
            });
        }

        Ok(CancellationReceipt {
            payment_id,
            order_id: payment.order_id,
            restored_items: items.len(),
        })
    }

    /// Loads one order with its items. Buyers see only their own orders;
    /// admins see any.
    ///
    /// # Errors
    ///
    /// [`MarketError::OrderNotFound`] for an unknown id or one the caller
    /// may not see, or [`MarketError::Database`] on failure.
    pub async fn get_order(
        &self,
        ctx: &SessionContext,
        order_id: OrderId,
    ) -> Result<OrderDetail, MarketError> {
        let mut conn = self.pool.acquire().await?;

        let order = order_store::get_order(&mut conn, order_id)
            .await?
            .ok_or(MarketError::OrderNotFound(*order_id.as_uuid()))?;
        if ctx.role != Role::Admin && order.buyer_id != ctx.user_id {
            return Err(MarketError::OrderNotFound(*order_id.as_uuid()));
        }

        let items = order_store::items_for_order(&mut conn, order_id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Loads a page of the caller's own orders, newest first, with the
    /// total count for pagination.
    ///
    /// # Errors
    ///
    /// [`MarketError::Forbidden`] unless the caller is a buyer, or
    /// [`MarketError::Database`] on failure.
    pub async fn list_orders(
        &self,
        ctx: &SessionContext,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Order>, i64), MarketError> {
        let buyer = ctx.require_buyer()?;

        let mut conn = self.pool.acquire().await?;
        let orders = order_store::orders_for_buyer(&mut conn, buyer, limit, offset).await?;
        let total = order_store::count_for_buyer(&mut conn, buyer).await?;
        Ok((orders, total))
    }

    /// Loads one payment. Visible to its buyer and to admins.
    ///
    /// # Errors
    ///
    /// [`MarketError::PaymentNotFound`] for an unknown id or one the
    /// caller may not see, or [`MarketError::Database`] on failure.
    pub async fn get_payment(
        &self,
        ctx: &SessionContext,
        payment_id: PaymentId,
    ) -> Result<Payment, MarketError> {
        let mut conn = self.pool.acquire().await?;

        let payment = payment_store::get_payment(&mut conn, payment_id)
            .await?
            .ok_or(MarketError::PaymentNotFound(*payment_id.as_uuid()))?;
        if ctx.role != Role::Admin && payment.buyer_id != ctx.user_id {
            return Err(MarketError::PaymentNotFound(*payment_id.as_uuid()));
        }
        Ok(payment)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    #[test]
    fn frozen_items_mirror_cart_lines() {
        let buyer = UserId::new();
        let lines = vec![
            CartLine {
                buyer_id: buyer,
                product_id: ProductId::new(),
                quantity: 3,
                price_at_add: Decimal::new(5000, 2),
                added_at: Utc::now(),
            },
            CartLine {
                buyer_id: buyer,
                product_id: ProductId::new(),
                quantity: 1,
                price_at_add: Decimal::new(3000, 2),
                added_at: Utc::now(),
            },
        ];

        let order_id = OrderId::new();
        let items = freeze_lines(order_id, &lines);

        assert_eq!(items.len(), lines.len());
        for (item, line) in items.iter().zip(&lines) {
            assert_eq!(item.order_id, order_id);
            assert_eq!(item.product_id, line.product_id);
            assert_eq!(item.quantity, line.quantity);
            assert_eq!(item.price_at_order, line.price_at_add);
        }
        // What the items record is exactly what cancellation will restore.
        let item_units: i32 = items.iter().map(|item| item.quantity).sum();
        let line_units: i32 = lines.iter().map(|line| line.quantity).sum();
        assert_eq!(item_units, line_units);
    }

    #[test]
    fn checkout_input_trims_address() {
        let address = validate_checkout_input("  12 Main Rd, Cape Town  ", Decimal::new(3000, 2));
        assert_eq!(address.ok(), Some("12 Main Rd, Cape Town"));
    }

    #[test]
    fn blank_address_is_rejected() {
        assert!(validate_checkout_input("   ", Decimal::ZERO).is_err());
        assert!(validate_checkout_input("", Decimal::ZERO).is_err());
    }

    #[test]
    fn negative_courier_cost_is_rejected() {
        let err = validate_checkout_input("12 Main Rd", Decimal::new(-1, 2));
        assert!(matches!(err, Err(MarketError::InvalidInput(_))));
    }

    #[test]
    fn zero_courier_cost_is_allowed() {
        assert!(validate_checkout_input("12 Main Rd", Decimal::ZERO).is_ok());
    }
}
