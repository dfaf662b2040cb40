//! # cbfeed-core
//!
//! Core crate for the cbfeed market-data client, providing:
//!
//! - **Types** (`types`): product ids, order flags, channels, order-book tuples
//! - **Messages** (`message`): the closed `FeedMessage` union and its variants
//! - **Codec** (`codec`): registry-driven JSON encode/decode
//! - **Subscriptions** (`subscription`): subscribe/unsubscribe construction
//! - **Configuration** (`config`): JSON config deserialization
//! - **Error types** (`error`): `FeedError` and `DecodeError` via thiserror
//! - **WebSocket** (`ws`): single connection task with keep-alive pings
//! - **Frame fields** (`json_util`): top-level tag and ticker fields via borrowed serde structs
//! - **Time utilities** (`time_util`): wall-clock and monotonic timestamps
//! - **Logging** (`logging`): tracing-based structured logging

pub mod codec;
pub mod config;
pub mod error;
pub mod json_util;
pub mod logging;
pub mod message;
pub mod subscription;
pub mod time_util;
pub mod types;
pub mod ws;

// Re-export types at crate root for convenience.
pub use codec::FeedCodec;
pub use error::{DecodeError, FeedError};
pub use message::{FeedMessage, MessageType};
pub use types::*;
