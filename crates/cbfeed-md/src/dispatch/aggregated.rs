//! Ordered fan-out to a list of child handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use super::{MessageHandler, SharedHandler, invoke_isolated};

/// Invokes every registered child, in registration order, for each message.
///
/// The child list is copy-on-write: [`add`](Self::add) takes the lock only
/// to push, and delivery takes it only to clone the `Arc` of the current
/// list. Children are invoked with no lock held, so registration can happen
/// from any thread (including from inside a child) while a message is
/// being dispatched. A child registered mid-dispatch first sees the next
/// message.
///
/// A panicking child is logged and skipped; its siblings still run.
#[derive(Default)]
pub struct AggregatedHandler {
    handlers: Mutex<Arc<Vec<SharedHandler>>>,
}

impl AggregatedHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handlers(handlers: Vec<SharedHandler>) -> Self {
        Self { handlers: Mutex::new(Arc::new(handlers)) }
    }

    /// Append `handler`. Registering an aggregation inside itself would
    /// recurse on every message, so that is refused with a warning.
    pub fn add(&self, handler: SharedHandler) {
        if std::ptr::addr_eq(Arc::as_ptr(&handler), self as *const Self) {
            warn!("[aggregated] refusing to register a handler into itself");
            return;
        }
        Arc::make_mut(&mut self.lock()).push(handler);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn snapshot(&self) -> Arc<Vec<SharedHandler>> {
        Arc::clone(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Arc<Vec<SharedHandler>>> {
        // Children never run under the lock, so a poisoned list is intact.
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MessageHandler for AggregatedHandler {
    fn on_message(&self, message: &str) {
        for handler in self.snapshot().iter() {
            invoke_isolated("aggregated", handler.as_ref(), message);
        }
    }
}

impl std::fmt::Debug for AggregatedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregatedHandler").field("handlers", &self.len()).finish()
    }
}
