//! Cart endpoint handlers: view, add, update, remove.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    AddItemRequest, CartMutationResponse, CartViewResponse, RemoveItemResponse,
    UpdateQuantityRequest,
};
use crate::app_state::AppState;
use crate::domain::{ProductId, SessionContext};
use crate::error::{ErrorResponse, MarketError};

/// `GET /cart` — View the cart with live stock per line.
///
/// # Errors
///
/// Returns [`MarketError`] when the session is invalid or the caller is
/// not a buyer.
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    tag = "Cart",
    summary = "View the cart",
    description = "Returns the buyer's cart lines with each product's live stock and the recomputed total. Lines whose quantity exceeds live stock will fail checkout until corrected.",
    responses(
        (status = 200, description = "Current cart", body = CartViewResponse),
        (status = 401, description = "Invalid session", body = ErrorResponse),
        (status = 403, description = "Not a buyer", body = ErrorResponse),
    )
)]
pub async fn view_cart(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<impl IntoResponse, MarketError> {
    let view = state.cart_service.view_cart(&ctx).await?;
    Ok(Json(CartViewResponse::from(view)))
}

/// `POST /cart/items` — Add units of a product to the cart.
///
/// # Errors
///
/// Returns [`MarketError`] on invalid quantity, unknown product, or
/// insufficient stock.
#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    tag = "Cart",
    summary = "Add a product to the cart",
    description = "Adds the requested units on top of any existing cart line for the product. Nothing is reserved; the response's available_stock is informational.",
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Cart updated", body = CartMutationResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Insufficient stock", body = ErrorResponse),
    )
)]
pub async fn add_item(
    State(state): State<AppState>,
    ctx: SessionContext,
    Json(req): Json<AddItemRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let update = state
        .cart_service
        .add_item(&ctx, ProductId::from_uuid(req.product_id), req.quantity)
        .await?;

    Ok(Json(CartMutationResponse {
        available_stock: update.available_stock,
        cart_total: update.cart_total,
    }))
}

/// `PUT /cart/items/{product_id}` — Set a cart line to an explicit
/// quantity.
///
/// # Errors
///
/// Returns [`MarketError`] on unknown product or insufficient stock; the
/// existing line is left unchanged on rejection.
#[utoipa::path(
    put,
    path = "/api/v1/cart/items/{product_id}",
    tag = "Cart",
    summary = "Update a cart line",
    description = "Sets the absolute quantity of a cart line. Zero or less removes the line. A quantity above live stock is rejected, not clamped.",
    params(
        ("product_id" = uuid::Uuid, Path, description = "Product UUID"),
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Cart updated", body = CartMutationResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Insufficient stock", body = ErrorResponse),
    )
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(product_id): Path<uuid::Uuid>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let update = state
        .cart_service
        .update_quantity(&ctx, ProductId::from_uuid(product_id), req.quantity)
        .await?;

    Ok(Json(CartMutationResponse {
        available_stock: update.available_stock,
        cart_total: update.cart_total,
    }))
}

/// `DELETE /cart/items/{product_id}` — Remove a product from the cart.
///
/// # Errors
///
/// Returns [`MarketError`] when the session is invalid; removing an
/// absent line succeeds.
#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{product_id}",
    tag = "Cart",
    summary = "Remove a cart line",
    description = "Removes the product from the cart. Idempotent: removing an absent line succeeds.",
    params(
        ("product_id" = uuid::Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Cart updated", body = RemoveItemResponse),
        (status = 401, description = "Invalid session", body = ErrorResponse),
    )
)]
pub async fn remove_item(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(product_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let cart_total = state
        .cart_service
        .remove_item(&ctx, ProductId::from_uuid(product_id))
        .await?;

    Ok(Json(RemoveItemResponse { cart_total }))
}

/// Cart routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(view_cart))
        .route("/cart/items", post(add_item))
        .route(
            "/cart/items/{product_id}",
            put(update_quantity).delete(remove_item),
        )
}
