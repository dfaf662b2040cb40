//! Catalog of handler constructors for common use cases.

use std::sync::Arc;
use std::time::Duration;

use cbfeed_core::error::FeedError;
use cbfeed_core::json_util::ticker_fields;
use rust_decimal::Decimal;
use tracing::info;

use super::predicated::type_is;
use super::{AggregatedHandler, MessageHandler, PredicatedHandler, SharedHandler, TimedHandler};

/// Log the message as indented JSON, or verbatim if it is not JSON.
pub fn pretty_print(message: &str) {
    match serde_json::from_str::<serde_json::Value>(message).and_then(|v| serde_json::to_string_pretty(&v)) {
        Ok(pretty) => info!("{pretty}"),
        Err(_) => info!("could not pretty-print: {message}"),
    }
}

/// Pull the top-level `price` of a ticker frame without decoding the rest
/// of it. Non-ticker frames have no price.
pub fn price_from_ticker(message: &str) -> Option<Decimal> {
    ticker_fields(message)?.price
}

/// Wrap `handler` so it is invoked at most once per `delay`.
pub fn timed(delay: Duration, handler: SharedHandler) -> SharedHandler {
    Arc::new(TimedHandler::new(delay, handler))
}

/// Wrap `handler` so it only sees messages matching `predicate`.
pub fn predicated<P>(predicate: P, handler: SharedHandler) -> SharedHandler
where
    P: Fn(&str) -> bool + Send + Sync + 'static,
{
    Arc::new(PredicatedHandler::new(predicate, handler))
}

/// Combine handlers into one that invokes each in order. Aggregating fewer
/// than two handlers is rejected.
pub fn aggregate(handlers: Vec<SharedHandler>) -> Result<SharedHandler, FeedError> {
    if handlers.len() < 2 {
        return Err(FeedError::Validation(format!("aggregation needs at least two handlers, got {}", handlers.len())));
    }
    Ok(Arc::new(AggregatedHandler::with_handlers(handlers)))
}

/// Route messages whose `type` equals `tag` to `handlers`. A single handler
/// is wrapped directly; several are aggregated first.
pub fn by_type(tag: &str, mut handlers: Vec<SharedHandler>) -> Result<SharedHandler, FeedError> {
    let inner = match handlers.len() {
        0 => return Err(FeedError::Validation(format!("no handlers given for type {tag:?}"))),
        1 => handlers.remove(0),
        _ => aggregate(handlers)?,
    };
    Ok(predicated(type_is(tag), inner))
}

/// Collects handlers for [`FeedSessionBuilder::with_handlers`](crate::session::FeedSessionBuilder::with_handlers).
///
/// Construction errors are deferred to [`build`](Self::build) so calls can
/// be chained.
#[derive(Default)]
pub struct HandlerList {
    handlers: Vec<SharedHandler>,
    error: Option<FeedError>,
}

impl HandlerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler<H>(mut self, handler: H) -> Self
    where
        H: MessageHandler + 'static,
    {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn shared(mut self, handler: SharedHandler) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn by_type(self, tag: &str, handlers: Vec<SharedHandler>) -> Self {
        let result = by_type(tag, handlers);
        self.push_result(result)
    }

    pub fn aggregate(self, handlers: Vec<SharedHandler>) -> Self {
        let result = aggregate(handlers);
        self.push_result(result)
    }

    pub fn predicated<P>(mut self, predicate: P, handler: SharedHandler) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.handlers.push(predicated(predicate, handler));
        self
    }

    pub fn build(self) -> Result<Vec<SharedHandler>, FeedError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.handlers),
        }
    }

    fn push_result(mut self, result: Result<SharedHandler, FeedError>) -> Self {
        match result {
            Ok(handler) => self.handlers.push(handler),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }
}
