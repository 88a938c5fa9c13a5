//! Data Transfer Objects for REST request/response serialization.
//!
//! All monetary amounts serialize through `rust_decimal::Decimal` to avoid
//! floating-point drift on the wire.

pub mod cart_dto;
pub mod common_dto;
pub mod order_dto;
pub mod payment_dto;
pub mod session_dto;

pub use cart_dto::*;
pub use common_dto::*;
pub use order_dto::*;
pub use payment_dto::*;
pub use session_dto::*;
