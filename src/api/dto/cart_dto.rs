//! Cart request/response DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::service::{CartLineView, CartView};

/// Request body for `POST /cart/items`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemRequest {
    /// Product to add.
    pub product_id: uuid::Uuid,
    /// Units to add on top of any existing cart line. Must be at least 1.
    pub quantity: i32,
}

/// Request body for `PUT /cart/items/{product_id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    /// New absolute quantity. Zero or less removes the line.
    pub quantity: i32,
}

/// Response body for cart mutations.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartMutationResponse {
    /// Units of the product available right now. Informational only;
    /// nothing is held until checkout.
    pub available_stock: i32,
    /// Recomputed cart total.
    pub cart_total: Decimal,
}

/// Response body for `DELETE /cart/items/{product_id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveItemResponse {
    /// Recomputed cart total.
    pub cart_total: Decimal,
}

/// One cart line in the cart view.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineDto {
    /// Product the line refers to.
    pub product_id: uuid::Uuid,
    /// Current catalog name.
    pub name: String,
    /// Units in the cart.
    pub quantity: i32,
    /// Price snapshot from when the line was added.
    pub price_at_add: Decimal,
    /// `price_at_add × quantity`.
    pub line_total: Decimal,
    /// Live stock for this product; lines where `quantity >
    /// available_stock` have gone stale and will fail checkout.
    pub available_stock: i32,
}

/// Response body for `GET /cart`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartViewResponse {
    /// Cart lines, ordered by product id.
    pub lines: Vec<CartLineDto>,
    /// Recomputed cart total.
    pub total: Decimal,
}

impl From<CartLineView> for CartLineDto {
    fn from(view: CartLineView) -> Self {
        Self {
            product_id: *view.product_id.as_uuid(),
            name: view.name,
            quantity: view.quantity,
            price_at_add: view.price_at_add,
            line_total: view.line_total,
            available_stock: view.available_stock,
        }
    }
}

impl From<CartView> for CartViewResponse {
    fn from(view: CartView) -> Self {
        Self {
            total: view.total,
            lines: view.lines.into_iter().map(CartLineDto::from).collect(),
        }
    }
}
