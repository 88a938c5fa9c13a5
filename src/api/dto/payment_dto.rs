//! Payment DTOs: detail, confirmation, cancellation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Payment;
use crate::service::CancellationReceipt;

/// Request body for `POST /payments/{id}/confirm`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    /// Reference of the vetted proof of payment (e.g. a bank transfer
    /// reference). Must not be blank.
    pub pop_reference: String,
}

/// One payment in detail responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentDto {
    /// Payment identifier.
    pub payment_id: uuid::Uuid,
    /// Order this payment settles.
    pub order_id: uuid::Uuid,
    /// Sum of the order items.
    pub cart_amount: Decimal,
    /// Courier cost component.
    pub courier_cost: Decimal,
    /// `cart_amount + courier_cost`.
    pub total_amount: Decimal,
    /// Settlement state: `pending`, `successful`, or `failed`.
    pub payment_status: String,
    /// Lifecycle flag: `open`, `complete`, or `cancelled`.
    pub status: String,
    /// Accepted proof-of-payment reference, if settled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pop_reference: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last state-change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Response body for `POST /payments/{id}/cancel`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CancelPaymentResponse {
    /// The cancelled payment.
    pub payment_id: uuid::Uuid,
    /// The cancelled order.
    pub order_id: uuid::Uuid,
    /// Number of distinct products whose stock was restored.
    pub restored_items: usize,
}

impl From<Payment> for PaymentDto {
    fn from(payment: Payment) -> Self {
        Self {
            payment_id: *payment.id.as_uuid(),
            order_id: *payment.order_id.as_uuid(),
            cart_amount: payment.cart_amount,
            courier_cost: payment.courier_cost,
            total_amount: payment.total_amount,
            payment_status: payment.payment_status.as_str().to_string(),
            status: payment.status.as_str().to_string(),
            pop_reference: payment.pop_reference,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

impl From<CancellationReceipt> for CancelPaymentResponse {
    fn from(receipt: CancellationReceipt) -> Self {
        Self {
            payment_id: *receipt.payment_id.as_uuid(),
            order_id: *receipt.order_id.as_uuid(),
            restored_items: receipt.restored_items,
        }
    }
}
