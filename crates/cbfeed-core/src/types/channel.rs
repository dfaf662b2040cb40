//! Subscription channels.
//!
//! A [`Channel`] names a stream and optionally scopes it to a set of
//! products. Channels are immutable values: the global constants carry no
//! products and [`Channel::with_products`] returns a scoped copy.

use serde::{Deserialize, Serialize};

use super::enums::ChannelType;
use super::product::ProductId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub name: ChannelType,
    /// Per-channel products. Takes precedence over the top-level
    /// `product_ids` of a subscribe request for this channel.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_ids: Vec<ProductId>,
}

impl Channel {
    pub const HEARTBEAT: Channel = Channel::global(ChannelType::Heartbeat);
    pub const STATUS: Channel = Channel::global(ChannelType::Status);
    pub const TICKER: Channel = Channel::global(ChannelType::Ticker);
    pub const LEVEL2: Channel = Channel::global(ChannelType::Level2);
    pub const USER: Channel = Channel::global(ChannelType::User);
    pub const MATCHES: Channel = Channel::global(ChannelType::Matches);
    pub const FULL: Channel = Channel::global(ChannelType::Full);

    /// A channel with no product scope.
    pub const fn global(name: ChannelType) -> Self {
        Self { name, product_ids: Vec::new() }
    }

    /// Copy of this channel scoped to `product_ids` (appended to any
    /// products it already carries).
    pub fn with_products<I>(&self, product_ids: I) -> Self
    where
        I: IntoIterator<Item = ProductId>,
    {
        let mut scoped = self.clone();
        scoped.product_ids.extend(product_ids);
        scoped
    }

    pub fn is_scoped(&self) -> bool {
        !self.product_ids.is_empty()
    }
}

impl From<ChannelType> for Channel {
    fn from(name: ChannelType) -> Self {
        Self::global(name)
    }
}
