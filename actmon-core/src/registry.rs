//! Activity Registry - one decaying counter per channel
//!
//! The registry is the shared state of the estimator:
//! - Counters are created lazily on first reference, with the configured τ
//! - Lookups and insertions go through a sharded concurrent map
//! - Each counter carries its own lock, so channels never block each other

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

use crate::{ActivityConfig, ChannelKey, DecayCounter};

/// Concurrent map from channel key to its counter
#[derive(Debug)]
pub struct ActivityRegistry {
    entries: DashMap<ChannelKey, Arc<DecayCounter>>,
    config: ActivityConfig,
}

impl ActivityRegistry {
    pub fn new(config: ActivityConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
        }
    }

    /// Return the counter for `key`, creating it at `now` if absent.
    ///
    /// Concurrent callers racing on the same new key all receive the same
    /// counter; the map's entry lock decides which one constructs it.
    pub fn get_or_create(&self, key: &ChannelKey, now: Instant) -> Arc<DecayCounter> {
        if let Some(counter) = self.entries.get(key) {
            return Arc::clone(counter.value());
        }

        let counter = self.entries.entry(key.clone()).or_insert_with(|| {
            debug!("Creating activity counter for {}", key);
            Arc::new(DecayCounter::new(self.config.decay_constant, now))
        });
        Arc::clone(counter.value())
    }

    /// Existing counter for `key`, without creating one
    pub fn get(&self, key: &ChannelKey) -> Option<Arc<DecayCounter>> {
        self.entries.get(key).map(|c| Arc::clone(c.value()))
    }

    /// Record one event for `key` at `now`
    pub fn record_event(&self, key: &ChannelKey, now: Instant) -> f64 {
        let score = self.get_or_create(key, now).record_event(now);
        trace!("Event on {} (score {:.4})", key, score);
        score
    }

    /// Decayed score of `key` as of `now`
    pub fn score(&self, key: &ChannelKey, now: Instant) -> f64 {
        self.get_or_create(key, now).current_score(now)
    }

    /// Implied rate of `key` in events per second as of `now`
    pub fn rate(&self, key: &ChannelKey, now: Instant) -> f64 {
        self.get_or_create(key, now).current_rate(now)
    }

    pub fn config(&self) -> &ActivityConfig {
        &self.config
    }

    /// Number of tracked channels
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of all tracked channels, sorted
    pub fn channels(&self) -> Vec<ChannelKey> {
        let mut keys: Vec<_> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// All channels with their score and rate, busiest first
    pub fn snapshot(&self, now: Instant) -> Vec<ChannelActivity> {
        let mut activity: Vec<_> = self
            .entries
            .iter()
            .map(|entry| {
                let score = entry.value().current_score(now);
                ChannelActivity {
                    channel: entry.key().clone(),
                    score,
                    rate: score / entry.value().decay_constant(),
                }
            })
            .collect();

        activity.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.channel.cmp(&b.channel))
        });
        activity
    }

    /// Aggregate statistics as of `now`
    pub fn stats(&self, now: Instant) -> RegistryStats {
        let snapshot = self.snapshot(now);
        let total_score = snapshot.iter().map(|a| a.score).sum();

        RegistryStats {
            channels: snapshot.len(),
            total_score,
            busiest: snapshot.into_iter().next(),
        }
    }

    /// Drop channels whose score has decayed below `min_score`.
    ///
    /// Returns the number of channels removed. A counter still held by a caller
    /// keeps working but is no longer reachable through the registry.
    pub fn prune(&self, now: Instant, min_score: f64) -> usize {
        let mut removed = 0;

        self.entries.retain(|key, counter| {
            let keep = counter.current_score(now) >= min_score;
            if !keep {
                debug!("Pruning idle channel {}", key);
                removed += 1;
            }
            keep
        });

        removed
    }
}

impl Default for ActivityRegistry {
    fn default() -> Self {
        Self::new(ActivityConfig::default())
    }
}

/// Activity of one channel at a point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelActivity {
    pub channel: ChannelKey,
    pub score: f64,
    /// Events per second
    pub rate: f64,
}

/// Registry statistics
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    pub channels: usize,
    pub total_score: f64,
    pub busiest: Option<ChannelActivity>,
}
