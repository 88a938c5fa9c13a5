//! Payment endpoint handlers: detail, confirm, cancel.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CancelPaymentResponse, ConfirmPaymentRequest, PaymentDto};
use crate::app_state::AppState;
use crate::domain::{PaymentId, SessionContext};
use crate::error::{ErrorResponse, MarketError};

/// `GET /payments/{id}` — Get one payment.
///
/// # Errors
///
/// Returns [`MarketError::PaymentNotFound`] for an unknown payment or one
/// the caller may not see.
#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    tag = "Payments",
    summary = "Get payment details",
    description = "Returns one payment record. Visible to the owning buyer and to admins.",
    params(
        ("id" = uuid::Uuid, Path, description = "Payment UUID"),
    ),
    responses(
        (status = 200, description = "Payment details", body = PaymentDto),
        (status = 404, description = "Payment not found", body = ErrorResponse),
    )
)]
pub async fn get_payment(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let payment = state
        .order_service
        .get_payment(&ctx, PaymentId::from_uuid(id))
        .await?;

    Ok(Json(PaymentDto::from(payment)))
}

/// `POST /payments/{id}/confirm` — Accept proof of payment.
///
/// # Errors
///
/// Returns [`MarketError`] unless the caller is an admin and the payment
/// is still pending; a second confirmation is rejected.
#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/confirm",
    tag = "Payments",
    summary = "Confirm a payment",
    description = "Accepts a vetted proof-of-payment reference: the payment becomes successful/complete and its order becomes paid. Stock is untouched; it was committed at checkout.",
    params(
        ("id" = uuid::Uuid, Path, description = "Payment UUID"),
    ),
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Payment confirmed", body = PaymentDto),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 409, description = "Payment already settled", body = ErrorResponse),
    )
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let payment = state
        .order_service
        .confirm_payment(&ctx, PaymentId::from_uuid(id), &req.pop_reference)
        .await?;

    Ok(Json(PaymentDto::from(payment)))
}

/// `POST /payments/{id}/cancel` — Cancel a pending payment.
///
/// # Errors
///
/// Returns [`MarketError::InvalidCancellation`] when the payment is
/// unknown, not owned by the caller, or already settled; nothing is
/// written on failure.
#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/cancel",
    tag = "Payments",
    summary = "Cancel a payment",
    description = "Cancels a pending payment owned by the caller: the payment fails, its order is cancelled, and every order item's quantity is returned to product stock exactly once.",
    params(
        ("id" = uuid::Uuid, Path, description = "Payment UUID"),
    ),
    responses(
        (status = 200, description = "Payment cancelled, stock restored", body = CancelPaymentResponse),
        (status = 409, description = "Payment cannot be cancelled", body = ErrorResponse),
    )
)]
pub async fn cancel_payment(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let receipt = state
        .order_service
        .cancel_payment(&ctx, PaymentId::from_uuid(id))
        .await?;

    Ok(Json(CancelPaymentResponse::from(receipt)))
}

/// Payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments/{id}", get(get_payment))
        .route("/payments/{id}/confirm", post(confirm_payment))
        .route("/payments/{id}/cancel", post(cancel_payment))
}
