//! REST endpoint handlers organized by resource.

pub mod cart;
pub mod order;
pub mod payment;
pub mod session;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(session::routes())
        .merge(cart::routes())
        .merge(order::routes())
        .merge(payment::routes())
}
