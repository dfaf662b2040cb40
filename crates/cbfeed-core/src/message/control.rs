//! Control messages: subscription requests, the subscription ack and errors.

use serde::{Deserialize, Serialize};

use super::MessageMeta;
use crate::types::{Channel, ProductId};

/// Outbound request to start streaming `channels`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscribeMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_ids: Vec<ProductId>,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

/// Outbound request to stop streaming `channels`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnsubscribeMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_ids: Vec<ProductId>,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

/// Server ack listing the channels now active on the connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionsMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<Channel>,
}

/// Server-side error, usually a rejected subscription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
