//! WebSocket message types: envelope and subscription commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands a client can send over WebSocket.
///
/// The feed is read-only: clients subscribe to stock movements for
/// specific products (or everything with `"*"`); mutations stay on REST
/// where the session extractor lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to events for specific products.
    Subscribe {
        /// Product IDs to subscribe to. Use `["*"]` for all events,
        /// including those not tied to any product (orders, payments).
        product_ids: Vec<String>,
    },
    /// Unsubscribe from events for specific products.
    Unsubscribe {
        /// Product IDs to unsubscribe from.
        product_ids: Vec<String>,
    },
}
