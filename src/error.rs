//! Gateway error types with HTTP status code mapping.
//!
//! [`MarketError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Server-side failures (database, internal) are logged in full but surfaced
//! to the caller as a generic retryable message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "insufficient stock for Widget: 2 available",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`MarketError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status                  |
/// |-----------|---------------------|------------------------------|
/// | 1000–1099 | Validation          | 400 Bad Request              |
/// | 1100–1199 | Authentication      | 401 / 403                    |
/// | 2000–2099 | Not Found           | 404 Not Found                |
/// | 2100–2199 | State Conflict      | 409 Conflict                 |
/// | 3000–3999 | Server              | 500 Internal Server Error    |
/// | 4000–4999 | Cart/Stock          | 409 Conflict / 422           |
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Malformed quantity, address, or payload; rejected before any
    /// transaction opens.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Username/password verification failed.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The presented session is missing, inactive, or idle-expired. A
    /// session invalidated by a later login lands here.
    #[error("session is no longer active; log in again")]
    SessionRevoked,

    /// Authenticated, but the role or ownership check failed.
    #[error("operation not permitted for this account")]
    Forbidden,

    /// Product with the given ID was not found.
    #[error("product not found: {0}")]
    ProductNotFound(uuid::Uuid),

    /// Order with the given ID was not found.
    #[error("order not found: {0}")]
    OrderNotFound(uuid::Uuid),

    /// Payment with the given ID was not found.
    #[error("payment not found: {0}")]
    PaymentNotFound(uuid::Uuid),

    /// Live stock cannot cover the requested quantity; nothing was written.
    #[error("insufficient stock for {item_name}: {available} available")]
    InsufficientStock {
        /// Units available right now.
        available: i32,
        /// Display name of the offending product.
        item_name: String,
    },

    /// The payment is not pending or not owned by the caller; nothing was
    /// written.
    #[error("payment cannot be cancelled")]
    InvalidCancellation,

    /// Confirmation attempted on a payment that already settled.
    #[error("payment is not pending")]
    PaymentNotPending,

    /// Checkout attempted with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Underlying database/transaction failure; everything rolled back.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidInput(_) => 1001,
            Self::InvalidCredentials => 1101,
            Self::SessionRevoked => 1102,
            Self::Forbidden => 1103,
            Self::ProductNotFound(_) => 2001,
            Self::OrderNotFound(_) => 2002,
            Self::PaymentNotFound(_) => 2003,
            Self::InvalidCancellation => 2101,
            Self::PaymentNotPending => 2102,
            Self::InsufficientStock { .. } => 4001,
            Self::EmptyCart => 4002,
            Self::Database(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::SessionRevoked => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::ProductNotFound(_) | Self::OrderNotFound(_) | Self::PaymentNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::InsufficientStock { .. } | Self::InvalidCancellation | Self::PaymentNotPending => {
                StatusCode::CONFLICT
            }
            Self::EmptyCart => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller.
    ///
    /// Server-side failures are reduced to a generic retryable message;
    /// their detail goes to the log, never over the wire.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => {
                "the operation could not be completed; please retry".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.public_message(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn stock_error_carries_detail_for_the_user() {
        let err = MarketError::InsufficientStock {
            available: 2,
            item_name: "Widget".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 4001);
        let msg = err.public_message();
        assert!(msg.contains("Widget"));
        assert!(msg.contains('2'));
    }

    #[test]
    fn database_errors_are_redacted() {
        let err = MarketError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let msg = err.public_message();
        assert!(!msg.to_lowercase().contains("pool"));
        assert!(msg.contains("retry"));
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(
            MarketError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            MarketError::SessionRevoked.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(MarketError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn conflict_family_maps_to_409() {
        assert_eq!(
            MarketError::InvalidCancellation.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            MarketError::PaymentNotPending.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(MarketError::EmptyCart.error_code(), 4002);
        assert_eq!(
            MarketError::OrderNotFound(uuid::Uuid::new_v4()).error_code(),
            2002
        );
        assert_eq!(MarketError::Internal(String::new()).error_code(), 3000);
    }
}
