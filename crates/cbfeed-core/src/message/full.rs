//! Full-channel order lifecycle messages.
//!
//! The full channel reports each order individually: `received` when the
//! matching engine accepts it, `open` once it rests on the book, `match`
//! for each fill, `change` when its size is amended, `activate` when a stop
//! order triggers and `done` when it leaves the book.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MessageMeta;
use crate::types::{OrderSide, OrderStop, OrderType};

/// Order fields shared by every full-channel message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<OrderSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_size: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceivedOrderMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(flatten)]
    pub order: OrderFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_oid: Option<String>,
    /// Market orders may be sized in quote currency instead of `size`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funds: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenedOrderMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(flatten)]
    pub order: OrderFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClosedOrderMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(flatten)]
    pub order: OrderFields,
    /// `filled` or `canceled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchedOrderMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(flatten)]
    pub order: OrderFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maker_order_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_order_id: Option<Uuid>,

    // Present only on authenticated feeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_fee_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maker_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maker_profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maker_fee_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangedOrderMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(flatten)]
    pub order: OrderFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_size: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_size: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivatedOrderMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(flatten)]
    pub order: OrderFields,
    /// Activation time as fractional epoch seconds, e.g. `"1483736448.299000"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_type: Option<OrderStop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funds: Option<Decimal>,
    #[serde(default, rename = "private", skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}
