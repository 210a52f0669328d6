//! Time sources
//!
//! Every timestamp the estimator sees comes from a [`Clock`], so replays and
//! tests can drive time explicitly instead of sleeping.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Supplies the current monotonic instant
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually driven clock, measured as an offset from a fixed origin
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// The instant corresponding to offset zero
    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Instant `seconds` after the origin (negative values clamp to the origin)
    pub fn at(&self, seconds: f64) -> Instant {
        self.origin + Duration::from_secs_f64(seconds.max(0.0))
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Jump to an absolute offset, which may lie in the past
    pub fn set(&self, offset: Duration) {
        *self.offset.lock() = offset;
    }

    /// Jump to `seconds` after the origin
    pub fn set_secs(&self, seconds: f64) {
        self.set(Duration::from_secs_f64(seconds.max(0.0)));
    }

    /// Current offset from the origin
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance_and_rewind() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), clock.origin());

        clock.advance(Duration::from_secs(5));
        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.elapsed(), Duration::from_millis(5500));
        assert_eq!(clock.now(), clock.at(5.5));

        clock.set_secs(1.0);
        assert_eq!(clock.now(), clock.origin() + Duration::from_secs(1));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
