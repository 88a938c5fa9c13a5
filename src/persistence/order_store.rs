//! SQL for the `orders` and `order_items` tables.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domain::{Order, OrderId, OrderItem, OrderStatus, UserId};
use crate::error::MarketError;

type OrderRow = (Uuid, Uuid, String, Decimal, Decimal, DateTime<Utc>, String);

fn map_order(
    (id, buyer_id, delivery_address, total_amount, courier_cost, order_date, status): OrderRow,
) -> Result<Order, MarketError> {
    Ok(Order {
        id: id.into(),
        buyer_id: buyer_id.into(),
        delivery_address,
        total_amount,
        courier_cost,
        order_date,
        status: OrderStatus::from_str(&status)?,
    })
}

/// Inserts a new order row.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn insert_order(conn: &mut PgConnection, order: &Order) -> Result<(), MarketError> {
    sqlx::query(
        "INSERT INTO orders (id, buyer_id, delivery_address, total_amount, courier_cost, \
                             order_date, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(*order.id.as_uuid())
    .bind(*order.buyer_id.as_uuid())
    .bind(&order.delivery_address)
    .bind(order.total_amount)
    .bind(order.courier_cost)
    .bind(order.order_date)
    .bind(order.status.as_str())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Inserts the frozen order items for an order.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn insert_items(
    conn: &mut PgConnection,
    items: &[OrderItem],
) -> Result<(), MarketError> {
    for item in items {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, price_at_order) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(*item.order_id.as_uuid())
        .bind(*item.product_id.as_uuid())
        .bind(item.quantity)
        .bind(item.price_at_order)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Loads one order, if present.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure, or
/// [`MarketError::Internal`] when the stored status is unknown.
pub async fn get_order(
    conn: &mut PgConnection,
    id: OrderId,
) -> Result<Option<Order>, MarketError> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, buyer_id, delivery_address, total_amount, courier_cost, order_date, status \
         FROM orders WHERE id = $1",
    )
    .bind(*id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(map_order).transpose()
}

/// Loads a page of a buyer's orders, newest first.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure, or
/// [`MarketError::Internal`] when a stored status is unknown.
pub async fn orders_for_buyer(
    conn: &mut PgConnection,
    buyer_id: UserId,
    limit: i64,
    offset: i64,
) -> Result<Vec<Order>, MarketError> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, buyer_id, delivery_address, total_amount, courier_cost, order_date, status \
         FROM orders WHERE buyer_id = $1 ORDER BY order_date DESC LIMIT $2 OFFSET $3",
    )
    .bind(*buyer_id.as_uuid())
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(map_order).collect()
}

/// Counts a buyer's orders, for pagination metadata.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn count_for_buyer(conn: &mut PgConnection, buyer_id: UserId) -> Result<i64, MarketError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE buyer_id = $1")
            .bind(*buyer_id.as_uuid())
            .fetch_one(&mut *conn)
            .await?;

    Ok(count)
}

/// Marks an order paid, only from an open (`pending`/`unpaid`) status.
///
/// Returns the number of rows changed; 0 means the order was not open.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn mark_paid(conn: &mut PgConnection, id: OrderId) -> Result<u64, MarketError> {
    let result = sqlx::query(
        "UPDATE orders SET status = 'paid' WHERE id = $1 AND status IN ('pending', 'unpaid')",
    )
    .bind(*id.as_uuid())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Marks an order cancelled, only from an open (`pending`/`unpaid`) status.
/// A `paid` or already-`cancelled` order is never overwritten.
///
/// Returns the number of rows changed; 0 means the order was not open.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn mark_cancelled(conn: &mut PgConnection, id: OrderId) -> Result<u64, MarketError> {
    let result = sqlx::query(
        "UPDATE orders SET status = 'cancelled' WHERE id = $1 AND status IN ('pending', 'unpaid')",
    )
    .bind(*id.as_uuid())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Loads an order's items, ordered by product id (stable lock order for the
/// cancellation restore loop).
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn items_for_order(
    conn: &mut PgConnection,
    id: OrderId,
) -> Result<Vec<OrderItem>, MarketError> {
    let rows = sqlx::query_as::<_, (Uuid, Uuid, i32, Decimal)>(
        "SELECT order_id, product_id, quantity, price_at_order FROM order_items \
         WHERE order_id = $1 ORDER BY product_id",
    )
    .bind(*id.as_uuid())
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(order_id, product_id, quantity, price_at_order)| OrderItem {
            order_id: order_id.into(),
            product_id: product_id.into(),
            quantity,
            price_at_order,
        })
        .collect())
}
