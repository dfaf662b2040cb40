//! Typed error definitions for the feed client.
//!
//! [`FeedError`] covers caller-facing failures (configuration, connection,
//! validation before send). [`DecodeError`] is the per-message failure
//! produced by the codec; consumers log it and drop the single message.
//! Both derive `std::error::Error` via `thiserror`, so they compose with
//! `anyhow::Result` at the binary boundary.

use thiserror::Error;

/// Domain-specific errors for the feed client.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// WebSocket connection, handshake, or communication error.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Operation not valid for the current session state.
    #[error("session error: {0}")]
    Session(String),

    /// Outbound message failed validation; nothing was written.
    #[error("validation error: {0}")]
    Validation(String),

    /// Text that is not a `BASE-QUOTE` product id.
    #[error("invalid product id: {0:?}")]
    InvalidProductId(String),

    /// Inbound message could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Serialization of an outbound message failed.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failure to turn wire text into a [`FeedMessage`](crate::message::FeedMessage).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame is not a JSON object with a string `type` field.
    #[error("invalid frame: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The top-level object has no `type` field.
    #[error("missing message type discriminator")]
    MissingDiscriminator,

    /// The `type` field names no registered message variant.
    #[error("unknown message type: {0:?}")]
    UnknownDiscriminator(String),

    /// The variant was resolved but its fields did not decode.
    #[error("malformed {message_type} message: {source}")]
    Malformed {
        message_type: String,
        #[source]
        source: serde_json::Error,
    },
}
