//! Last traded price per product, gated on sequence number.
//!
//! The feed may deliver duplicates or reorder messages across reconnects.
//! A ticker is accepted for a product only if its sequence is strictly
//! greater than the one already stored, so applying the same stream in any
//! order converges on the update with the highest sequence. Stale updates
//! are not errors; they are simply ignored.

use ahash::RandomState;
use cbfeed_core::json_util::{TickerFields, ticker_fields};
use cbfeed_core::message::TickerMessage;
use cbfeed_core::time_util::now_us;
use cbfeed_core::types::ProductId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use tracing::debug;

use super::Tracker;

/// Accepted state for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRecord {
    pub sequence: u64,
    pub price: Decimal,
    /// Wall-clock acceptance time, microseconds since epoch.
    pub updated_at_us: u64,
}

/// Concurrent map of product to last accepted ticker price.
///
/// Updates for the same product serialize on that key's shard lock; reads
/// and updates for other products proceed in parallel.
#[derive(Debug, Default)]
pub struct PriceTracker {
    records: DashMap<ProductId, PriceRecord, RandomState>,
}

impl PriceTracker {
    pub fn new() -> Self {
        Self { records: DashMap::with_hasher(RandomState::new()) }
    }

    /// Offer `(sequence, price)` for `product_id`. Returns whether it was
    /// accepted.
    pub fn observe(&self, product_id: &ProductId, sequence: u64, price: Decimal) -> bool {
        let record = PriceRecord { sequence, price, updated_at_us: now_us() };
        match self.records.entry(product_id.clone()) {
            Entry::Occupied(mut entry) => {
                if sequence > entry.get().sequence {
                    entry.insert(record);
                    true
                } else {
                    debug!("[price] stale {product_id} seq {sequence} <= {}", entry.get().sequence);
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(record);
                true
            }
        }
    }

    /// Offer a decoded ticker. Tickers missing product, sequence or price
    /// are ignored.
    pub fn update_ticker(&self, ticker: &TickerMessage) -> bool {
        match (&ticker.meta.product_id, ticker.meta.sequence, ticker.price) {
            (Some(product_id), Some(sequence), Some(price)) => self.observe(product_id, sequence, price),
            _ => false,
        }
    }

    /// Last accepted price, or `None` if the product was never observed.
    pub fn price(&self, product_id: &ProductId) -> Option<Decimal> {
        self.records.get(product_id).map(|r| r.price)
    }

    pub fn record(&self, product_id: &ProductId) -> Option<PriceRecord> {
        self.records.get(product_id).map(|r| *r)
    }

    pub fn tracked_product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self.records.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Tracker for PriceTracker {
    /// Read the top-level `product_id`, `sequence` and `price` of a ticker
    /// frame. Anything else is ignored.
    fn update(&self, message: &str) {
        match ticker_fields(message) {
            Some(TickerFields { product_id: Some(product_id), sequence: Some(sequence), price: Some(price) }) => {
                self.observe(&product_id, sequence, price);
            }
            Some(_) => debug!("[price] ticker without product/sequence/price ignored"),
            None => {}
        }
    }
}
