//! Feed message model: the closed set of message variants.
//!
//! Every JSON payload on the feed carries a `type` discriminator naming
//! exactly one [`FeedMessage`] variant. Each variant wraps a plain struct
//! that implements [`Message`]; all of them share [`MessageMeta`]
//! (`sequence`, `time`, `product_id`), flattened into the top-level object.
//!
//! Absent optional fields are omitted when encoding and tolerated when
//! decoding; unknown fields are ignored.
//!
//! | Variant | `type` | Module |
//! |---------|--------|--------|
//! | `Subscribe`, `Unsubscribe`, `Subscriptions`, `Error` | control | [`control`] |
//! | `Ticker`, `Heartbeat`, `Snapshot`, `L2Update` | market data | [`market`] |
//! | `Received`, `Opened`, `Closed`, `Matched`, `Changed`, `Activated` | full channel | [`full`] |

pub mod control;
pub mod full;
pub mod market;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::types::ProductId;

pub use control::*;
pub use full::*;
pub use market::*;

/// JSON key holding the variant discriminator.
pub const TYPE_FIELD: &str = "type";

// ---------------------------------------------------------------------------
// Discriminators
// ---------------------------------------------------------------------------

/// Wire discriminator for each [`FeedMessage`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Subscribe,
    Unsubscribe,
    Subscriptions,
    Error,
    Ticker,
    Heartbeat,
    Snapshot,
    L2Update,
    Received,
    Opened,
    /// Order left the book. The exchange tags this `done`, not `close`.
    Closed,
    Matched,
    Changed,
    Activated,
}

impl MessageType {
    pub const ALL: [MessageType; 14] = [
        Self::Subscribe,
        Self::Unsubscribe,
        Self::Subscriptions,
        Self::Error,
        Self::Ticker,
        Self::Heartbeat,
        Self::Snapshot,
        Self::L2Update,
        Self::Received,
        Self::Opened,
        Self::Closed,
        Self::Matched,
        Self::Changed,
        Self::Activated,
    ];

    /// The `type` string used on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::Subscriptions => "subscriptions",
            Self::Error => "error",
            Self::Ticker => "ticker",
            Self::Heartbeat => "heartbeat",
            Self::Snapshot => "snapshot",
            Self::L2Update => "l2update",
            Self::Received => "received",
            Self::Opened => "open",
            Self::Closed => "done",
            Self::Matched => "match",
            Self::Changed => "change",
            Self::Activated => "activate",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Request messages are sent by the client, never received.
    pub fn is_outbound(&self) -> bool {
        matches!(self, Self::Subscribe | Self::Unsubscribe)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Shared fields
// ---------------------------------------------------------------------------

/// Fields common to every variant. Server-assigned fields are absent on
/// outbound requests; `product_id` is absent on pure control messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
}

/// Capability shared by every variant struct.
pub trait Message: Serialize + DeserializeOwned + Into<FeedMessage> {
    const MESSAGE_TYPE: MessageType;

    fn meta(&self) -> &MessageMeta;

    fn message_type(&self) -> MessageType {
        Self::MESSAGE_TYPE
    }
}

macro_rules! impl_message {
    ($($ty:ident => $variant:ident),+ $(,)?) => {
        $(
            impl Message for $ty {
                const MESSAGE_TYPE: MessageType = MessageType::$variant;

                fn meta(&self) -> &MessageMeta {
                    &self.meta
                }
            }

            impl From<$ty> for FeedMessage {
                fn from(message: $ty) -> Self {
                    FeedMessage::$variant(message)
                }
            }
        )+

        impl FeedMessage {
            pub fn message_type(&self) -> MessageType {
                match self {
                    $(Self::$variant(_) => MessageType::$variant,)+
                }
            }

            pub fn meta(&self) -> &MessageMeta {
                match self {
                    $(Self::$variant(m) => &m.meta,)+
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Tagged union
// ---------------------------------------------------------------------------

/// Any message carried by the feed.
///
/// Serializing injects the `type` field. Decoding goes through
/// [`FeedCodec`](crate::codec::FeedCodec), which resolves the variant from
/// the discriminator before decoding its fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum FeedMessage {
    #[serde(rename = "subscribe")]
    Subscribe(SubscribeMessage),
    #[serde(rename = "unsubscribe")]
    Unsubscribe(UnsubscribeMessage),
    #[serde(rename = "subscriptions")]
    Subscriptions(SubscriptionsMessage),
    #[serde(rename = "error")]
    Error(ErrorMessage),
    #[serde(rename = "ticker")]
    Ticker(TickerMessage),
    #[serde(rename = "heartbeat")]
    Heartbeat(HeartbeatMessage),
    #[serde(rename = "snapshot")]
    Snapshot(SnapshotMessage),
    #[serde(rename = "l2update")]
    L2Update(L2UpdateMessage),
    #[serde(rename = "received")]
    Received(ReceivedOrderMessage),
    #[serde(rename = "open")]
    Opened(OpenedOrderMessage),
    #[serde(rename = "done")]
    Closed(ClosedOrderMessage),
    #[serde(rename = "match")]
    Matched(MatchedOrderMessage),
    #[serde(rename = "change")]
    Changed(ChangedOrderMessage),
    #[serde(rename = "activate")]
    Activated(ActivatedOrderMessage),
}

impl_message! {
    SubscribeMessage => Subscribe,
    UnsubscribeMessage => Unsubscribe,
    SubscriptionsMessage => Subscriptions,
    ErrorMessage => Error,
    TickerMessage => Ticker,
    HeartbeatMessage => Heartbeat,
    SnapshotMessage => Snapshot,
    L2UpdateMessage => L2Update,
    ReceivedOrderMessage => Received,
    OpenedOrderMessage => Opened,
    ClosedOrderMessage => Closed,
    MatchedOrderMessage => Matched,
    ChangedOrderMessage => Changed,
    ActivatedOrderMessage => Activated,
}

impl FeedMessage {
    pub fn sequence(&self) -> Option<u64> {
        self.meta().sequence
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.meta().time
    }

    pub fn product_id(&self) -> Option<&ProductId> {
        self.meta().product_id.as_ref()
    }

    pub fn as_ticker(&self) -> Option<&TickerMessage> {
        match self {
            Self::Ticker(ticker) => Some(ticker),
            _ => None,
        }
    }

    /// Check fields the exchange requires before the message may be sent.
    pub fn validate(&self) -> Result<(), FeedError> {
        match self {
            Self::Subscribe(m) if m.channels.is_empty() => {
                Err(FeedError::Validation("subscribe requires at least one channel".into()))
            }
            Self::Unsubscribe(m) if m.channels.is_empty() => {
                Err(FeedError::Validation("unsubscribe requires at least one channel".into()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_unique() {
        let mut tags: Vec<&str> = MessageType::ALL.iter().map(|t| t.as_str()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), MessageType::ALL.len());
    }

    #[test]
    fn from_tag_round_trips() {
        for t in MessageType::ALL {
            assert_eq!(MessageType::from_tag(t.as_str()), Some(t));
        }
        assert_eq!(MessageType::from_tag("unknown_thing"), None);
    }

    #[test]
    fn variant_reports_its_type() {
        let msg: FeedMessage = HeartbeatMessage::default().into();
        assert_eq!(msg.message_type(), MessageType::Heartbeat);
        assert_eq!(HeartbeatMessage::MESSAGE_TYPE, MessageType::Heartbeat);
    }

    #[test]
    fn serialization_injects_type_first() {
        let msg: FeedMessage = HeartbeatMessage { last_trade_id: Some(7), ..Default::default() }.into();
        assert_eq!(serde_json::to_string(&msg).unwrap(), r#"{"type":"heartbeat","last_trade_id":7}"#);
    }

    #[test]
    fn subscribe_without_channels_is_invalid() {
        let msg: FeedMessage = SubscribeMessage::default().into();
        assert!(matches!(msg.validate(), Err(FeedError::Validation(_))));
    }
}
