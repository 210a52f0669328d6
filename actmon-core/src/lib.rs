//! actmon Core - Decaying activity estimation per channel
//!
//! This crate provides the foundational primitives:
//! - Exponentially decaying event counters with an implied rate
//! - A concurrent registry that lazily creates one counter per channel
//! - Injectable clocks for deterministic replay and tests
//! - IRC-style channel keys and the activity report format

pub mod channel;
pub mod clock;
pub mod config;
pub mod counter;
pub mod monitor;
pub mod registry;

pub use channel::*;
pub use clock::*;
pub use config::*;
pub use counter::*;
pub use monitor::*;
pub use registry::*;

/// Default decay constant in seconds
pub const DEFAULT_DECAY_CONSTANT: f64 = 20.0;

/// Environment variable overriding the decay constant
pub const DECAY_CONSTANT_ENV: &str = "ACTMON_DECAY_CONSTANT";

/// Default interval between periodic activity reports
pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 60;
