//! Top-level field access on raw JSON frames.
//!
//! Handlers receive every frame as text. These helpers deserialize only the
//! fields they name into small borrowed structs; every other field, nested
//! objects included, is skipped by serde without being materialized. Only
//! keys of the outermost object are ever matched.

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::message::MessageType;
use crate::types::ProductId;

#[derive(Deserialize)]
struct Header<'a> {
    #[serde(rename = "type", borrow)]
    tag: Option<Cow<'a, str>>,
}

/// Top-level `type` tag of a frame. `Ok(None)` when the object has no tag.
pub fn message_tag(text: &str) -> serde_json::Result<Option<Cow<'_, str>>> {
    serde_json::from_str::<Header<'_>>(text).map(|header| header.tag)
}

/// Whether the top-level `type` of `text` equals `tag`. Text that does not
/// parse never matches.
pub fn tag_is(text: &str, tag: &str) -> bool {
    matches!(message_tag(text), Ok(Some(found)) if found == tag)
}

/// The fields a price consumer needs from a ticker frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerFields {
    pub product_id: Option<ProductId>,
    pub sequence: Option<u64>,
    pub price: Option<Decimal>,
}

#[derive(Deserialize)]
struct TickerFrame<'a> {
    #[serde(rename = "type", borrow)]
    tag: Option<Cow<'a, str>>,
    product_id: Option<ProductId>,
    sequence: Option<u64>,
    price: Option<Decimal>,
}

/// Read [`TickerFields`] from a frame whose top-level `type` is `ticker`.
/// Other frames, and tickers whose named fields do not parse, yield `None`.
pub fn ticker_fields(text: &str) -> Option<TickerFields> {
    let frame = serde_json::from_str::<TickerFrame<'_>>(text).ok()?;
    if frame.tag.as_deref() != Some(MessageType::Ticker.as_str()) {
        return None;
    }
    Some(TickerFields { product_id: frame.product_id, sequence: frame.sequence, price: frame.price })
}
