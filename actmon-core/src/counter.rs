//! Exponentially decaying event counter
//!
//! A counter stores a single score and the instant it was last updated:
//! - Recording an event decays the stored score up to "now" and adds 1
//! - Reading computes the decayed score without persisting it
//! - The implied rate is score / decay constant (events per second)
//!
//! For a steady stream of λ events/s the score converges to λτ/(1 - e^(-1/λτ)) ≈ λτ,
//! so dividing by τ yields an events-per-second estimate.

use parking_lot::Mutex;
use std::f64::consts::LN_2;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct CounterState {
    score: f64,
    last_event: Instant,
}

/// Decaying activity score for a single channel
#[derive(Debug)]
pub struct DecayCounter {
    /// Score and timestamp are always read and written together
    state: Mutex<CounterState>,

    /// Time constant in seconds, fixed at construction
    decay_constant: f64,
}

impl DecayCounter {
    /// Create an empty counter. `created_at` stands in for the last event
    /// until one is recorded.
    pub fn new(decay_constant: f64, created_at: Instant) -> Self {
        debug_assert!(decay_constant.is_finite() && decay_constant > 0.0);

        Self {
            state: Mutex::new(CounterState {
                score: 0.0,
                last_event: created_at,
            }),
            decay_constant,
        }
    }

    /// Record one event at `now` and return the updated score.
    ///
    /// If `now` is earlier than the last event, no decay is applied and the
    /// last-event instant is left unchanged.
    pub fn record_event(&self, now: Instant) -> f64 {
        let mut state = self.state.lock();
        let elapsed = now.saturating_duration_since(state.last_event);

        state.score = state.score * self.decay_factor(elapsed) + 1.0;
        // The anchor never moves backwards, so no interval is decayed twice.
        state.last_event = state.last_event.max(now);
        state.score
    }

    /// Score as of `now`, without persisting the decay
    pub fn current_score(&self, now: Instant) -> f64 {
        let state = *self.state.lock();
        let elapsed = now.saturating_duration_since(state.last_event);
        state.score * self.decay_factor(elapsed)
    }

    /// Implied event rate in events per second
    pub fn current_rate(&self, now: Instant) -> f64 {
        self.current_score(now) / self.decay_constant
    }

    pub fn decay_constant(&self) -> f64 {
        self.decay_constant
    }

    /// Time for the score to halve with no further events: ln(2) * τ
    pub fn half_life(&self) -> Duration {
        half_life(self.decay_constant)
    }

    /// Instant of the last recorded event (creation time if none)
    pub fn last_event(&self) -> Instant {
        self.state.lock().last_event
    }

    fn decay_factor(&self, elapsed: Duration) -> f64 {
        (-elapsed.as_secs_f64() / self.decay_constant).exp()
    }
}

/// Half-life for a given decay constant in seconds
pub fn half_life(decay_constant: f64) -> Duration {
    Duration::from_secs_f64(LN_2 * decay_constant)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_fresh_counter_is_empty() {
        let t0 = Instant::now();
        let counter = DecayCounter::new(20.0, t0);

        assert_eq!(counter.current_score(t0), 0.0);
        assert_eq!(counter.current_rate(t0 + secs(5.0)), 0.0);
    }

    #[test]
    fn test_first_event_scores_one() {
        let t0 = Instant::now();
        let counter = DecayCounter::new(20.0, t0);

        // Creation long before the first event contributes nothing
        let score = counter.record_event(t0 + secs(300.0));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_decay_over_one_time_constant() {
        let t0 = Instant::now();
        let counter = DecayCounter::new(20.0, t0);
        counter.record_event(t0);

        let score = counter.current_score(t0 + secs(20.0));
        // e^(-1) ≈ 0.368
        assert!((score - (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_reference_scenario() {
        let t0 = Instant::now();
        let counter = DecayCounter::new(20.0, t0);

        counter.record_event(t0);
        assert_eq!(counter.current_score(t0), 1.0);

        let t20 = t0 + secs(20.0);
        assert!((counter.current_score(t20) - 0.368).abs() < 1e-3);

        counter.record_event(t20);
        assert!((counter.current_score(t20) - 1.368).abs() < 1e-3);
    }

    #[test]
    fn test_read_does_not_mutate() {
        let t0 = Instant::now();
        let counter = DecayCounter::new(20.0, t0);
        counter.record_event(t0);

        let later = t0 + secs(10.0);
        let first = counter.current_score(later);
        let second = counter.current_score(later);
        assert_eq!(first, second);
        assert_eq!(counter.last_event(), t0);
        assert_eq!(counter.current_score(t0), 1.0);
    }

    #[test]
    fn test_clock_going_backwards_is_clamped() {
        let t0 = Instant::now() + secs(100.0);
        let counter = DecayCounter::new(20.0, t0);
        counter.record_event(t0);

        let earlier = t0 - secs(50.0);
        assert_eq!(counter.current_score(earlier), 1.0);

        // No decay applied, just the increment
        assert_eq!(counter.record_event(earlier), 2.0);
        assert_eq!(counter.last_event(), t0);
    }

    #[test]
    fn test_rate_is_score_over_decay_constant() {
        let t0 = Instant::now();
        let counter = DecayCounter::new(10.0, t0);
        for _ in 0..5 {
            counter.record_event(t0);
        }

        assert!((counter.current_rate(t0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_half_life() {
        let counter = DecayCounter::new(20.0, Instant::now());
        let expected = 20.0 * std::f64::consts::LN_2;
        assert!((counter.half_life().as_secs_f64() - expected).abs() < 1e-6);

        let t0 = Instant::now();
        let counter = DecayCounter::new(20.0, t0);
        counter.record_event(t0);
        let halved = counter.current_score(t0 + counter.half_life());
        assert!((halved - 0.5).abs() < 1e-6);
    }
}
