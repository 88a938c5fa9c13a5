//! Order and checkout DTOs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::{Order, OrderItem};
use crate::service::OrderDetail;

/// Request body for `POST /orders` (checkout).
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Where the order ships to. Must not be blank.
    pub delivery_address: String,
    /// Courier cost the buyer accepted, added to the cart amount.
    pub courier_cost: Decimal,
}

/// Response body for `POST /orders`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// The new order.
    pub order_id: uuid::Uuid,
    /// The payment awaiting proof of payment.
    pub payment_id: uuid::Uuid,
    /// Order total including courier cost.
    pub total_amount: Decimal,
}

/// One order in list and detail responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDto {
    /// Order identifier.
    pub order_id: uuid::Uuid,
    /// Delivery address captured at checkout.
    pub delivery_address: String,
    /// Order total including courier cost.
    pub total_amount: Decimal,
    /// Courier cost component.
    pub courier_cost: Decimal,
    /// When the order was created.
    pub order_date: DateTime<Utc>,
    /// Lifecycle status: `pending`, `unpaid`, `paid`, or `cancelled`.
    pub status: String,
}

/// One frozen order item.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemDto {
    /// Product sold.
    pub product_id: uuid::Uuid,
    /// Units sold.
    pub quantity: i32,
    /// Unit price frozen at checkout.
    pub price_at_order: Decimal,
    /// `price_at_order × quantity`.
    pub line_total: Decimal,
}

/// Response body for `GET /orders/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    /// The order.
    #[serde(flatten)]
    pub order: OrderDto,
    /// Its items, ordered by product id.
    pub items: Vec<OrderItemDto>,
}

/// Response body for `GET /orders`.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderListResponse {
    /// One page of orders, newest first.
    pub data: Vec<OrderDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        Self {
            order_id: *order.id.as_uuid(),
            delivery_address: order.delivery_address,
            total_amount: order.total_amount,
            courier_cost: order.courier_cost,
            order_date: order.order_date,
            status: order.status.as_str().to_string(),
        }
    }
}

impl From<OrderItem> for OrderItemDto {
    fn from(item: OrderItem) -> Self {
        let line_total = item.line_total();
        Self {
            product_id: *item.product_id.as_uuid(),
            quantity: item.quantity,
            price_at_order: item.price_at_order,
            line_total,
        }
    }
}

impl From<OrderDetail> for OrderDetailResponse {
    fn from(detail: OrderDetail) -> Self {
        Self {
            order: OrderDto::from(detail.order),
            items: detail.items.into_iter().map(OrderItemDto::from).collect(),
        }
    }
}
