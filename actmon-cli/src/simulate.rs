//! Synthetic Poisson traffic for checking the rate estimate

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use actmon_core::{ActivityConfig, ActivityMonitor, ManualClock};

const CHANNEL: &str = "#simulated";

/// Estimate sampled at one point in simulated time
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    pub seconds: f64,
    pub score: f64,
    pub rate: f64,
}

/// Outcome of a simulation run
#[derive(Debug, Clone, Serialize)]
pub struct Simulation {
    pub true_rate: f64,
    pub duration: f64,
    pub events: u64,
    pub observed_rate: f64,
    pub estimated_rate: f64,
    pub samples: Vec<Sample>,
}

/// Feed Poisson arrivals at `rate` events/s for `duration` seconds,
/// sampling the estimate every `step` seconds.
pub fn simulate(
    config: ActivityConfig,
    rate: f64,
    duration: f64,
    step: f64,
    seed: Option<u64>,
) -> Simulation {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let clock = Arc::new(ManualClock::new());
    let monitor = ActivityMonitor::new(config, clock.clone());

    let mut samples = Vec::new();
    let mut next_sample = step;
    let mut events = 0;
    let mut t = next_arrival(&mut rng, rate);

    while t <= duration {
        while next_sample <= t {
            samples.push(sample(&monitor, &clock, next_sample));
            next_sample += step;
        }
        clock.set_secs(t);
        monitor.on_message(CHANNEL);
        events += 1;
        t += next_arrival(&mut rng, rate);
    }
    while next_sample <= duration {
        samples.push(sample(&monitor, &clock, next_sample));
        next_sample += step;
    }

    clock.set_secs(duration);
    Simulation {
        true_rate: rate,
        duration,
        events,
        observed_rate: events as f64 / duration,
        estimated_rate: monitor.activity_rate(CHANNEL),
        samples,
    }
}

fn sample(monitor: &ActivityMonitor, clock: &ManualClock, seconds: f64) -> Sample {
    clock.set_secs(seconds);
    let report = monitor.report(CHANNEL);
    Sample {
        seconds,
        score: report.score,
        rate: report.per_second,
    }
}

/// Exponentially distributed inter-arrival time
fn next_arrival(rng: &mut StdRng, rate: f64) -> f64 {
    -(1.0 - rng.gen::<f64>()).ln() / rate
}
