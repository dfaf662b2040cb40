//! Microsecond timestamps.
//!
//! `now_us` is wall-clock time for stamping records; `monotonic_us` is for
//! interval measurement and never jumps backwards.

use std::sync::LazyLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

static ORIGIN: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Current time as **microseconds** since Unix epoch.
#[inline]
pub fn now_us() -> u64 {
    let d = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    d.as_micros() as u64
}

/// Monotonic clock in **microseconds**, measured from first use in this
/// process.
#[inline]
pub fn monotonic_us() -> u64 {
    ORIGIN.elapsed().as_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock_is_after_2020() {
        assert!(now_us() > 1_577_836_800_000_000);
    }

    #[test]
    fn monotonic_never_goes_backwards() {
        let a = monotonic_us();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = monotonic_us();
        assert!(b >= a + 1_000);
    }
}
