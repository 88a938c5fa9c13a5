//! SQL for the `payments` table.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domain::{Payment, PaymentId, PaymentLifecycle, PaymentStatus};
use crate::error::MarketError;

type PaymentRow = (
    Uuid,
    Uuid,
    Uuid,
    Decimal,
    Decimal,
    Decimal,
    String,
    String,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

const PAYMENT_COLUMNS: &str = "id, order_id, buyer_id, cart_amount, courier_cost, total_amount, \
                               payment_status, status, pop_reference, created_at, updated_at";

fn map_payment(row: PaymentRow) -> Result<Payment, MarketError> {
    let (
        id,
        order_id,
        buyer_id,
        cart_amount,
        courier_cost,
        total_amount,
        payment_status,
        status,
        pop_reference,
        created_at,
        updated_at,
    ) = row;

    Ok(Payment {
        id: id.into(),
        order_id: order_id.into(),
        buyer_id: buyer_id.into(),
        cart_amount,
        courier_cost,
        total_amount,
        payment_status: PaymentStatus::from_str(&payment_status)?,
        status: PaymentLifecycle::from_str(&status)?,
        pop_reference,
        created_at,
        updated_at,
    })
}

/// Inserts a new payment row.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn insert_payment(conn: &mut PgConnection, payment: &Payment) -> Result<(), MarketError> {
    sqlx::query(
        "INSERT INTO payments (id, order_id, buyer_id, cart_amount, courier_cost, total_amount, \
                               payment_status, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(*payment.id.as_uuid())
    .bind(*payment.order_id.as_uuid())
    .bind(*payment.buyer_id.as_uuid())
    .bind(payment.cart_amount)
    .bind(payment.courier_cost)
    .bind(payment.total_amount)
    .bind(payment.payment_status.as_str())
    .bind(payment.status.as_str())
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Loads one payment, if present.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure, or
/// [`MarketError::Internal`] when a stored status is unknown.
pub async fn get_payment(
    conn: &mut PgConnection,
    id: PaymentId,
) -> Result<Option<Payment>, MarketError> {
    let row = sqlx::query_as::<_, PaymentRow>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
    ))
    .bind(*id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(map_payment).transpose()
}

/// Loads one payment and takes an exclusive row lock on it.
///
/// Confirm and cancel both go through this, so a double-submit resolves to
/// one winner: the loser re-reads a settled payment and is rejected by the
/// state-machine guard.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure, or
/// [`MarketError::Internal`] when a stored status is unknown.
pub async fn get_payment_for_update(
    conn: &mut PgConnection,
    id: PaymentId,
) -> Result<Option<Payment>, MarketError> {
    let row = sqlx::query_as::<_, PaymentRow>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1 FOR UPDATE"
    ))
    .bind(*id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(map_payment).transpose()
}

/// Settles a payment: `pending → successful`, lifecycle `complete`, storing
/// the accepted proof-of-payment reference.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn mark_successful(
    conn: &mut PgConnection,
    id: PaymentId,
    pop_reference: &str,
) -> Result<u64, MarketError> {
    let result = sqlx::query(
        "UPDATE payments SET payment_status = 'successful', status = 'complete', \
                             pop_reference = $2, updated_at = now() \
         WHERE id = $1 AND payment_status = 'pending'",
    )
    .bind(*id.as_uuid())
    .bind(pop_reference)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Fails a payment: `pending → failed`, lifecycle `cancelled`.
///
/// # Errors
///
/// Returns [`MarketError::Database`] on query failure.
pub async fn mark_failed(conn: &mut PgConnection, id: PaymentId) -> Result<u64, MarketError> {
    let result = sqlx::query(
        "UPDATE payments SET payment_status = 'failed', status = 'cancelled', \
                             updated_at = now() \
         WHERE id = $1 AND payment_status = 'pending'",
    )
    .bind(*id.as_uuid())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
