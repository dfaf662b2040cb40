//! # cbfeed-md
//!
//! Streaming market-data client built on `cbfeed-core`.
//!
//! ## Architecture
//!
//! A [`session::FeedSession`] owns one WebSocket connection and a root
//! [`dispatch::AggregatedHandler`]. Each inbound frame is handed, as raw
//! text, to every registered handler in order; handlers compose by
//! wrapping one another (predicate, rate limit, decode, offload).
//!
//! ## Modules
//!
//! - [`dispatch`]: handler trait, composable handlers, handler catalog
//! - [`tracking`]: sequence-gated trackers (last price per product)
//! - [`session`]: session lifecycle, `FeedClient` trait and builder

pub mod dispatch;
pub mod session;
pub mod tracking;

pub use dispatch::{MessageHandler, SharedHandler};
pub use session::{FeedClient, FeedSession, FeedSessionBuilder, SessionState};
pub use tracking::{PriceTracker, Tracker};
