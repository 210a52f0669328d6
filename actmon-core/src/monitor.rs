//! Activity Monitor - the facade used by ingestion and command layers
//!
//! Binds a registry to a clock and exposes the three external operations:
//! `on_message`, `activity_score` and `activity_rate`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::{ActivityConfig, ActivityRegistry, ChannelKey, SharedClock, SystemClock};

/// Per-channel activity monitor
pub struct ActivityMonitor {
    registry: ActivityRegistry,
    clock: SharedClock,
}

impl ActivityMonitor {
    /// Create a monitor with an explicit clock
    pub fn new(config: ActivityConfig, clock: SharedClock) -> Self {
        Self {
            registry: ActivityRegistry::new(config),
            clock,
        }
    }

    /// Create a monitor driven by the system clock
    pub fn with_system_clock(config: ActivityConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    /// Record one message on `channel` at the current time
    pub fn on_message(&self, channel: &str) {
        let now = self.now();
        self.registry.record_event(&ChannelKey::normalize(channel), now);
    }

    /// Decayed activity score of `channel` as of now
    pub fn activity_score(&self, channel: &str) -> f64 {
        self.registry.score(&ChannelKey::normalize(channel), self.now())
    }

    /// Implied message rate of `channel` in messages per second
    pub fn activity_rate(&self, channel: &str) -> f64 {
        self.registry.rate(&ChannelKey::normalize(channel), self.now())
    }

    /// Score and rates of `channel`, read from a single snapshot
    pub fn report(&self, channel: &str) -> ActivityReport {
        let now = self.now();
        let counter = self
            .registry
            .get_or_create(&ChannelKey::normalize(channel), now);
        let score = counter.current_score(now);
        let per_second = score / counter.decay_constant();

        ActivityReport {
            channel: channel.to_string(),
            score,
            per_minute: per_second * 60.0,
            per_second,
            generated_at: Utc::now(),
        }
    }

    pub fn registry(&self) -> &ActivityRegistry {
        &self.registry
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }
}

impl fmt::Debug for ActivityMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityMonitor")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Answer to an activity query
#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    /// Channel name as asked for
    pub channel: String,
    pub score: f64,
    pub per_minute: f64,
    pub per_second: f64,
    /// Wall-clock time the report was built; independent of the monitor's clock
    pub generated_at: DateTime<Utc>,
}

impl fmt::Display for ActivityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Activity of {}: {:.4}, {:.4} msg/min, {:.4} msg/sec",
            self.channel, self.score, self.per_minute, self.per_second
        )
    }
}
