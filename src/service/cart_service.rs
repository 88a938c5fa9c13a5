//! Cart service: add, update, remove, and view cart lines.
//!
//! Nothing here reserves stock. Every stock-based decision takes the
//! product's row lock for the duration of its transaction, but the only
//! effect of a cart operation is on the buyer's own `cart` rows; stock is
//! committed at checkout and nowhere else.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::cart::combined_quantity;
use crate::domain::{ProductId, SessionContext};
use crate::error::MarketError;
use crate::persistence::{cart_store, catalog};

/// Result of a cart mutation: the product's live stock (a fact, not a
/// hold) and the recomputed cart total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartUpdate {
    /// Units of the product available right now, for "X in stock" display.
    pub available_stock: i32,
    /// `sum(price_at_add × quantity)` over the whole cart after the change.
    pub cart_total: Decimal,
}

/// One line of the cart view, joined with live catalog data.
#[derive(Debug, Clone)]
pub struct CartLineView {
    /// Product the line refers to.
    pub product_id: ProductId,
    /// Current catalog name.
    pub name: String,
    /// Units in the cart.
    pub quantity: i32,
    /// Price snapshot from when the line was added.
    pub price_at_add: Decimal,
    /// `price_at_add × quantity`.
    pub line_total: Decimal,
    /// Live stock, so the view can flag lines that have gone stale since
    /// they were added.
    pub available_stock: i32,
}

/// A buyer's full cart with its recomputed total.
#[derive(Debug, Clone)]
pub struct CartView {
    /// Lines, ordered by product id.
    pub lines: Vec<CartLineView>,
    /// Recomputed total; never cached.
    pub total: Decimal,
}

/// Cart operations for authenticated buyers.
#[derive(Debug, Clone)]
pub struct CartService {
    pool: PgPool,
}

impl CartService {
    /// Creates a new `CartService` on the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Adds `requested_qty` units of a product to the buyer's cart.
    ///
    /// Holds the product's row lock while deciding, so a concurrent add or
    /// checkout cannot observe stale stock. The new line quantity is the
    /// existing quantity plus the request; if that exceeds live stock the
    /// operation fails without mutating anything. On success the line's
    /// price snapshot is refreshed to the current catalog price.
    ///
    /// # Errors
    ///
    /// [`MarketError::InvalidInput`] for a non-positive quantity,
    /// [`MarketError::ProductNotFound`] for an unknown product,
    /// [`MarketError::InsufficientStock`] when the combined quantity
    /// exceeds live stock, or [`MarketError::Database`] on failure.
    pub async fn add_item(
        &self,
        ctx: &SessionContext,
        product_id: ProductId,
        requested_qty: i32,
    ) -> Result<CartUpdate, MarketError> {
        let buyer = ctx.require_buyer()?;
        if requested_qty < 1 {
            return Err(MarketError::InvalidInput(
                "quantity must be at least 1".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let product = catalog::get_product_for_update(&mut tx, product_id)
            .await?
            .ok_or(MarketError::ProductNotFound(*product_id.as_uuid()))?;

        let existing = cart_store::get_line(&mut tx, buyer, product_id).await?;
        let new_total = combined_quantity(existing.map(|line| line.quantity), requested_qty)?;
        product.ensure_available(new_total)?;

        cart_store::upsert_line(&mut tx, buyer, product_id, new_total, product.price).await?;
        let cart_total = cart_store::cart_total(&mut tx, buyer).await?;

        tx.commit().await?;

        tracing::debug!(%buyer, %product_id, quantity = new_total, "cart line upserted");

        Ok(CartUpdate {
            available_stock: product.stock_quantity,
            cart_total,
        })
    }

    /// Sets a cart line to an explicit quantity.
    ///
    /// A quantity of zero or less deletes the line (same as removal). A
    /// quantity above live stock is rejected, not clamped; the existing
    /// line stays as it was and the error carries what the buyer needs to
    /// self-correct.
    ///
    /// # Errors
    ///
    /// [`MarketError::ProductNotFound`] for an unknown product,
    /// [`MarketError::InvalidInput`] when the product is not in the cart,
    /// [`MarketError::InsufficientStock`] when `new_qty` exceeds live
    /// stock, or [`MarketError::Database`] on failure.
    pub async fn update_quantity(
        &self,
        ctx: &SessionContext,
        product_id: ProductId,
        new_qty: i32,
    ) -> Result<CartUpdate, MarketError> {
        let buyer = ctx.require_buyer()?;

        let mut tx = self.pool.begin().await?;

        if new_qty <= 0 {
            cart_store::delete_line(&mut tx, buyer, product_id).await?;
            let cart_total = cart_store::cart_total(&mut tx, buyer).await?;
            let available = catalog::get_product(&mut tx, product_id)
                .await?
                .map_or(0, |p| p.stock_quantity);
            tx.commit().await?;
            return Ok(CartUpdate {
                available_stock: available,
                cart_total,
            });
        }

        let product = catalog::get_product_for_update(&mut tx, product_id)
            .await?
            .ok_or(MarketError::ProductNotFound(*product_id.as_uuid()))?;
        product.ensure_available(new_qty)?;

        let changed = cart_store::set_quantity(&mut tx, buyer, product_id, new_qty).await?;
        if changed == 0 {
            return Err(MarketError::InvalidInput(
                "product is not in the cart".to_string(),
            ));
        }
        let cart_total = cart_store::cart_total(&mut tx, buyer).await?;

        tx.commit().await?;

        tracing::debug!(%buyer, %product_id, quantity = new_qty, "cart line updated");

        Ok(CartUpdate {
            available_stock: product.stock_quantity,
            cart_total,
        })
    }

    /// Removes a product from the cart. Idempotent: removing an absent
    /// line succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Database`] on failure.
    pub async fn remove_item(
        &self,
        ctx: &SessionContext,
        product_id: ProductId,
    ) -> Result<Decimal, MarketError> {
        let buyer = ctx.require_buyer()?;

        let mut tx = self.pool.begin().await?;
        cart_store::delete_line(&mut tx, buyer, product_id).await?;
        let cart_total = cart_store::cart_total(&mut tx, buyer).await?;
        tx.commit().await?;

        tracing::debug!(%buyer, %product_id, "cart line removed");

        Ok(cart_total)
    }

    /// Returns the buyer's cart with live stock per line and the
    /// recomputed total.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Database`] on failure.
    pub async fn view_cart(&self, ctx: &SessionContext) -> Result<CartView, MarketError> {
        let buyer = ctx.require_buyer()?;

        let mut conn = self.pool.acquire().await?;
        let rows = cart_store::lines_with_product(&mut conn, buyer).await?;

        let lines: Vec<CartLineView> = rows
            .into_iter()
            .map(|(line, name, stock)| CartLineView {
                product_id: line.product_id,
                name,
                quantity: line.quantity,
                price_at_add: line.price_at_add,
                line_total: line.line_total(),
                available_stock: stock,
            })
            .collect();
        let total = lines.iter().map(|line| line.line_total).sum();

        Ok(CartView { lines, total })
    }
}
