//! Order endpoint handlers: checkout and order history.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CheckoutRequest, CheckoutResponse, OrderDetailResponse, OrderDto, OrderListResponse,
    PaginationMeta, PaginationParams,
};
use crate::app_state::AppState;
use crate::domain::{OrderId, SessionContext};
use crate::error::{ErrorResponse, MarketError};

/// `POST /orders` — Check out the cart into an order and pending payment.
///
/// # Errors
///
/// Returns [`MarketError`] on empty cart, invalid input, or any line that
/// no longer fits live stock; nothing is written on failure.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "Orders",
    summary = "Check out the cart",
    description = "Atomically re-validates every cart line against live stock, decrements stock, creates the order with its items and a pending payment, and empties the cart. Any stale line aborts the whole checkout.",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created", body = CheckoutResponse),
        (status = 409, description = "A line exceeds live stock", body = ErrorResponse),
        (status = 422, description = "Cart is empty", body = ErrorResponse),
    )
)]
pub async fn checkout(
    State(state): State<AppState>,
    ctx: SessionContext,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let receipt = state
        .order_service
        .checkout(&ctx, &req.delivery_address, req.courier_cost)
        .await?;

    let response = CheckoutResponse {
        order_id: *receipt.order_id.as_uuid(),
        payment_id: *receipt.payment_id.as_uuid(),
        total_amount: receipt.total_amount,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /orders` — List the caller's orders, newest first.
///
/// # Errors
///
/// Returns [`MarketError`] when the session is invalid or the caller is
/// not a buyer.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "Orders",
    summary = "List orders",
    description = "Returns a paginated list of the caller's own orders, newest first.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated order list", body = OrderListResponse),
        (status = 401, description = "Invalid session", body = ErrorResponse),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    ctx: SessionContext,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, MarketError> {
    let params = params.clamped();
    let (orders, total) = state
        .order_service
        .list_orders(&ctx, params.limit(), params.offset())
        .await?;

    let total = u32::try_from(total).unwrap_or(u32::MAX);
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(params.per_page)
    };

    Ok(Json(OrderListResponse {
        data: orders.into_iter().map(OrderDto::from).collect(),
        pagination: PaginationMeta {
            page: params.page,
            per_page: params.per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /orders/{id}` — Get one order with its items.
///
/// # Errors
///
/// Returns [`MarketError::OrderNotFound`] for an unknown order or one the
/// caller may not see.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    summary = "Get order details",
    description = "Returns one order with its frozen items. Buyers see only their own orders; admins see any.",
    params(
        ("id" = uuid::Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order details", body = OrderDetailResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let detail = state
        .order_service
        .get_order(&ctx, OrderId::from_uuid(id))
        .await?;

    Ok(Json(OrderDetailResponse::from(detail)))
}

/// Order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(checkout).get(list_orders))
        .route("/orders/{id}", get(get_order))
}
