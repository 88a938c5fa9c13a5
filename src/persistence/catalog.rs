//! Catalog collaborator: product reads and the stock counters.
//!
//! This is the only module that touches `products`. The locked read is the
//! capability every stock-based commit decision goes through: holding the
//! row lock for the transaction's duration is what serializes two checkouts
//! racing for the last unit.

use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domain::{Product, ProductId};
use crate::error::MarketError;

/// Reads a product and takes an exclusive row lock on it for the rest of
/// the enclosing transaction.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn get_product_for_update(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<Option<Product>, MarketError> {
    let row = sqlx::query_as::<_, (Uuid, String, Decimal, i32)>(
        "SELECT id, name, price, stock_quantity FROM products WHERE id = $1 FOR UPDATE",
    )
    .bind(*id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(|(id, name, price, stock_quantity)| Product {
        id: id.into(),
        name,
        price,
        stock_quantity,
    }))
}

/// Reads a product without locking. For display paths only; never for a
/// commit decision.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn get_product(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<Option<Product>, MarketError> {
    let row = sqlx::query_as::<_, (Uuid, String, Decimal, i32)>(
        "SELECT id, name, price, stock_quantity FROM products WHERE id = $1",
    )
    .bind(*id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(|(id, name, price, stock_quantity)| Product {
        id: id.into(),
        name,
        price,
        stock_quantity,
    }))
}

/// Decrements a product's stock, returning the new counter value.
///
/// The `stock_quantity >= $2` predicate is a last-line guard: even if a
/// caller skipped validation, the counter can never go negative. Callers
/// validate first under the row lock, so a zero-row update here is an
/// internal invariant violation, not user input.
///
/// # Errors
///
/// Returns [`MarketError::Internal`] if the guarded update matched no row,
/// or [`MarketError::Database`] on query failure.
pub async fn decrement_stock(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: i32,
) -> Result<i32, MarketError> {
    let new_quantity = sqlx::query_scalar::<_, i32>(
        "UPDATE products SET stock_quantity = stock_quantity - $2, updated_at = now() \
         WHERE id = $1 AND stock_quantity >= $2 RETURNING stock_quantity",
    )
    .bind(*id.as_uuid())
    .bind(quantity)
    .fetch_optional(&mut *conn)
    .await?;

    new_quantity.ok_or_else(|| {
        MarketError::Internal(format!(
            "stock decrement of {quantity} would underflow for product {id}"
        ))
    })
}

/// Increments a product's stock, returning the new counter value.
///
/// # Errors
///
/// Returns [`MarketError::ProductNotFound`] if the product row is gone, or
/// [`MarketError::Database`] on query failure.
pub async fn increment_stock(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: i32,
) -> Result<i32, MarketError> {
    let new_quantity = sqlx::query_scalar::<_, i32>(
        "UPDATE products SET stock_quantity = stock_quantity + $2, updated_at = now() \
         WHERE id = $1 RETURNING stock_quantity",
    )
    .bind(*id.as_uuid())
    .bind(quantity)
    .fetch_optional(&mut *conn)
    .await?;

    new_quantity.ok_or(MarketError::ProductNotFound(*id.as_uuid()))
}
