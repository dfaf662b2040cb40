//! Minimum-interval rate limiting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use cbfeed_core::time_util::monotonic_us;

use super::{MessageHandler, SharedHandler};

const NEVER: u64 = u64::MAX;

/// Forwards a message only if at least `delay` has passed since the last
/// forwarded one. Messages inside the window are dropped, not queued. The
/// first message is always forwarded.
///
/// Lock-free: concurrent callers race on a compare-exchange of the last
/// forward timestamp and only the winner forwards.
pub struct TimedHandler {
    delay_us: u64,
    last_forward_us: AtomicU64,
    handler: SharedHandler,
}

impl TimedHandler {
    pub fn new(delay: Duration, handler: SharedHandler) -> Self {
        Self {
            delay_us: delay.as_micros().min(u128::from(u64::MAX - 1)) as u64,
            last_forward_us: AtomicU64::new(NEVER),
            handler,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_micros(self.delay_us)
    }
}

impl MessageHandler for TimedHandler {
    fn on_message(&self, message: &str) {
        let now = monotonic_us();
        let last = self.last_forward_us.load(Ordering::Acquire);
        if last != NEVER && now.saturating_sub(last) < self.delay_us {
            return;
        }
        if self.last_forward_us.compare_exchange(last, now, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return;
        }
        self.handler.on_message(message);
    }
}
