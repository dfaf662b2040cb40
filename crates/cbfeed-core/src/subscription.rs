//! Subscribe/unsubscribe request construction.
//!
//! Requests are pure values; nothing here touches the network. Each channel
//! may carry its own product scope, which overrides the top-level
//! `product_ids` for that channel. The exchange is authoritative on what a
//! legal subscription is, so product coverage is only checked advisorily.

use tracing::warn;

use crate::error::FeedError;
use crate::message::{FeedMessage, SubscribeMessage, UnsubscribeMessage};
use crate::types::{Channel, ProductId};

/// Build a `subscribe` request for `channels`, scoped to `product_ids`.
pub fn build_subscribe(channels: &[Channel], product_ids: &[ProductId]) -> Result<FeedMessage, FeedError> {
    check_channels("subscribe", channels, product_ids)?;
    Ok(SubscribeMessage { product_ids: product_ids.to_vec(), channels: channels.to_vec(), ..Default::default() }.into())
}

/// Build an `unsubscribe` request; mirror image of [`build_subscribe`].
pub fn build_unsubscribe(channels: &[Channel], product_ids: &[ProductId]) -> Result<FeedMessage, FeedError> {
    check_channels("unsubscribe", channels, product_ids)?;
    Ok(UnsubscribeMessage { product_ids: product_ids.to_vec(), channels: channels.to_vec(), ..Default::default() }
        .into())
}

fn check_channels(request: &str, channels: &[Channel], product_ids: &[ProductId]) -> Result<(), FeedError> {
    if channels.is_empty() {
        return Err(FeedError::Validation(format!("{request} requires at least one channel")));
    }
    if product_ids.is_empty() {
        for channel in channels.iter().filter(|c| c.name.requires_product() && !c.is_scoped()) {
            warn!("[subscription] {request}: channel {} has no product ids; the exchange may reject it", channel.name);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Accumulated channels and products for a session's subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subscription {
    channels: Vec<Channel>,
    product_ids: Vec<ProductId>,
}

impl Subscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels<I>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = Channel>,
    {
        self.channels.extend(channels);
        self
    }

    pub fn with_products<I>(mut self, product_ids: I) -> Self
    where
        I: IntoIterator<Item = ProductId>,
    {
        self.product_ids.extend(product_ids);
        self
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn product_ids(&self) -> &[ProductId] {
        &self.product_ids
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn subscribe_message(&self) -> Result<FeedMessage, FeedError> {
        build_subscribe(&self.channels, &self.product_ids)
    }

    pub fn unsubscribe_message(&self) -> Result<FeedMessage, FeedError> {
        build_unsubscribe(&self.channels, &self.product_ids)
    }
}
