//! Market data messages: ticker, heartbeat and level-2 order book.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MessageMeta;
use crate::types::{L2OrderTuple, OrderSide};

/// Latest trade and best bid/ask for a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<OrderSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_size: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_bid: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_ask: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_24h: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_24h: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_24h: Option<Decimal>,
}

/// Liveness message, one per second per subscribed product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_trade_id: Option<u64>,
}

/// Full order-book state sent once when a level-2 subscription starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bids: Vec<L2OrderTuple>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub asks: Vec<L2OrderTuple>,
}

/// Incremental order-book changes; each change carries its side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct L2UpdateMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<L2OrderTuple>,
}
