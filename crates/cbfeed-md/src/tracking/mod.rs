//! Consistency trackers: state derived from the feed that must stay
//! monotonic under duplicated or out-of-order delivery.

pub mod price;

use std::sync::Arc;

use crate::dispatch::SharedHandler;

pub use price::{PriceRecord, PriceTracker};

/// Consumer that folds raw frames into tracked state.
///
/// Frames it cannot use are ignored; `update` never fails.
pub trait Tracker: Send + Sync {
    fn update(&self, message: &str);
}

/// Adapt a tracker into a dispatch handler.
pub fn tracker_handler<T>(tracker: Arc<T>) -> SharedHandler
where
    T: Tracker + ?Sized + 'static,
{
    Arc::new(move |message: &str| tracker.update(message))
}
