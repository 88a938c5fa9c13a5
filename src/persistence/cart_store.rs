//! SQL for the `cart` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domain::{CartLine, ProductId, UserId};
use crate::error::MarketError;

fn map_line(
    (buyer_id, product_id, quantity, price_at_add, added_at): (
        Uuid,
        Uuid,
        i32,
        Decimal,
        DateTime<Utc>,
    ),
) -> CartLine {
    CartLine {
        buyer_id: buyer_id.into(),
        product_id: product_id.into(),
        quantity,
        price_at_add,
        added_at,
    }
}

/// Loads all of a buyer's cart lines, ordered by product id.
///
/// The ordering matters: checkout locks product rows while iterating these
/// lines, and a stable order prevents lock-order inversion between two
/// concurrent multi-line checkouts.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn lines_for_buyer(
    conn: &mut PgConnection,
    buyer_id: UserId,
) -> Result<Vec<CartLine>, MarketError> {
    let rows = sqlx::query_as::<_, (Uuid, Uuid, i32, Decimal, DateTime<Utc>)>(
        "SELECT buyer_id, product_id, quantity, price_at_add, added_at FROM cart \
         WHERE buyer_id = $1 ORDER BY product_id",
    )
    .bind(*buyer_id.as_uuid())
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(map_line).collect())
}

/// Loads one cart line, if present.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn get_line(
    conn: &mut PgConnection,
    buyer_id: UserId,
    product_id: ProductId,
) -> Result<Option<CartLine>, MarketError> {
    let row = sqlx::query_as::<_, (Uuid, Uuid, i32, Decimal, DateTime<Utc>)>(
        "SELECT buyer_id, product_id, quantity, price_at_add, added_at FROM cart \
         WHERE buyer_id = $1 AND product_id = $2",
    )
    .bind(*buyer_id.as_uuid())
    .bind(*product_id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(map_line))
}

/// Inserts a cart line or replaces the quantity and price snapshot of an
/// existing one. `added_at` keeps its original value on conflict.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn upsert_line(
    conn: &mut PgConnection,
    buyer_id: UserId,
    product_id: ProductId,
    quantity: i32,
    price_at_add: Decimal,
) -> Result<(), MarketError> {
    sqlx::query(
        "INSERT INTO cart (buyer_id, product_id, quantity, price_at_add) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (buyer_id, product_id) \
         DO UPDATE SET quantity = EXCLUDED.quantity, price_at_add = EXCLUDED.price_at_add",
    )
    .bind(*buyer_id.as_uuid())
    .bind(*product_id.as_uuid())
    .bind(quantity)
    .bind(price_at_add)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Sets the quantity of an existing line, leaving the price snapshot alone.
///
/// Returns the number of rows changed (0 when the line does not exist).
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn set_quantity(
    conn: &mut PgConnection,
    buyer_id: UserId,
    product_id: ProductId,
    quantity: i32,
) -> Result<u64, MarketError> {
    let result = sqlx::query(
        "UPDATE cart SET quantity = $3 WHERE buyer_id = $1 AND product_id = $2",
    )
    .bind(*buyer_id.as_uuid())
    .bind(*product_id.as_uuid())
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Deletes one cart line. Idempotent: deleting an absent line is not an
/// error.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn delete_line(
    conn: &mut PgConnection,
    buyer_id: UserId,
    product_id: ProductId,
) -> Result<u64, MarketError> {
    let result = sqlx::query("DELETE FROM cart WHERE buyer_id = $1 AND product_id = $2")
        .bind(*buyer_id.as_uuid())
        .bind(*product_id.as_uuid())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Deletes all of a buyer's cart lines (the en-masse delete at checkout).
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn clear_cart(conn: &mut PgConnection, buyer_id: UserId) -> Result<u64, MarketError> {
    let result = sqlx::query("DELETE FROM cart WHERE buyer_id = $1")
        .bind(*buyer_id.as_uuid())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Recomputes the cart total as `sum(price_at_add × quantity)`.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn cart_total(conn: &mut PgConnection, buyer_id: UserId) -> Result<Decimal, MarketError> {
    let total = sqlx::query_scalar::<_, Decimal>(
        "SELECT COALESCE(SUM(price_at_add * quantity), 0) FROM cart WHERE buyer_id = $1",
    )
    .bind(*buyer_id.as_uuid())
    .fetch_one(&mut *conn)
    .await?;

    Ok(total)
}

/// Loads a buyer's cart lines joined with the product's current name and
/// live stock, for the cart view.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn lines_with_product(
    conn: &mut PgConnection,
    buyer_id: UserId,
) -> Result<Vec<(CartLine, String, i32)>, MarketError> {
    let rows = sqlx::query_as::<_, (Uuid, Uuid, i32, Decimal, DateTime<Utc>, String, i32)>(
        "SELECT c.buyer_id, c.product_id, c.quantity, c.price_at_add, c.added_at, \
                p.name, p.stock_quantity \
         FROM cart c JOIN products p ON p.id = c.product_id \
         WHERE c.buyer_id = $1 ORDER BY c.product_id",
    )
    .bind(*buyer_id.as_uuid())
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(buyer_id, product_id, quantity, price_at_add, added_at, name, stock)| {
            (
                map_line((buyer_id, product_id, quantity, price_at_add, added_at)),
                name,
                stock,
            )
        })
        .collect())
}
