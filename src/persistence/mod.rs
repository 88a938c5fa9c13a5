//! Persistence layer: raw SQL per table, composed inside transactions.
//!
//! Every function takes `&mut PgConnection` so callers decide the
//! transaction boundary: a service opens one transaction per operation and
//! threads it through whatever store functions the operation needs. Row
//! locking (`SELECT ... FOR UPDATE`) and conditional updates live here;
//! business sequencing lives in the service layer.

pub mod cart_store;
pub mod catalog;
pub mod order_store;
pub mod payment_store;
pub mod session_store;
