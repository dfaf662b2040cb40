//! Dispatch pipeline for raw inbound frames.
//!
//! Every handler implements [`MessageHandler`] over the raw JSON text, so
//! they nest freely:
//!
//! ```text
//! session ──► AggregatedHandler ──► PredicatedHandler("ticker") ──► tracker
//!                               ──► TimedHandler(5s) ──► price report
//!                               ──► DecodingHandler ──► typed consumer
//! ```
//!
//! Handlers run synchronously on the connection task and must be quick;
//! slow consumers should sit behind an [`OffloadHandler`].

pub mod aggregated;
pub mod decoding;
pub mod handlers;
pub mod offload;
pub mod predicated;
pub mod timed;

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::error;

pub use aggregated::AggregatedHandler;
pub use decoding::DecodingHandler;
pub use handlers::HandlerList;
pub use offload::OffloadHandler;
pub use predicated::PredicatedHandler;
pub use timed::TimedHandler;

/// Consumer of raw feed frames.
pub trait MessageHandler: Send + Sync {
    fn on_message(&self, message: &str);
}

impl<F> MessageHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_message(&self, message: &str) {
        self(message)
    }
}

/// Handler shared between the session and any wrappers around it.
pub type SharedHandler = Arc<dyn MessageHandler>;

/// Invoke `handler`, logging and swallowing a panic instead of unwinding
/// into the caller. Returns `false` if the handler panicked.
pub(crate) fn invoke_isolated(label: &str, handler: &dyn MessageHandler, message: &str) -> bool {
    match catch_unwind(AssertUnwindSafe(|| handler.on_message(message))) {
        Ok(()) => true,
        Err(payload) => {
            error!("[{label}] handler panicked: {}", panic_message(payload.as_ref()));
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
