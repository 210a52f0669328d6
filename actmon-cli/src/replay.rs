//! Offline replay of timestamped message logs
//!
//! Each line is `<seconds> <target>`; blank lines are skipped. Time is driven
//! by a manual clock, so a replay takes as long as parsing the file.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use actmon_core::{is_channel, ActivityConfig, ActivityMonitor, ActivityReport, ManualClock};

/// One parsed log entry
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub seconds: f64,
    pub target: String,
}

/// Parse a replay log
pub fn parse_log(input: &str) -> Result<Vec<LogEntry>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_entry(line).with_context(|| format!("line {}", i + 1)))
        .collect()
}

fn parse_entry(line: &str) -> Result<LogEntry> {
    let mut parts = line.split_whitespace();
    let seconds = parts
        .next()
        .ok_or_else(|| anyhow!("missing timestamp"))?
        .parse::<f64>()
        .context("invalid timestamp")?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(anyhow!("timestamp must be a non-negative number, got {}", seconds));
    }
    let target = parts.next().ok_or_else(|| anyhow!("missing target"))?;

    Ok(LogEntry {
        seconds,
        target: target.to_string(),
    })
}

/// Replay `entries` and report on `channels` (all seen channels if empty)
/// as of `at` seconds, or the last timestamp in the log.
pub fn replay(
    config: ActivityConfig,
    entries: &[LogEntry],
    channels: &[String],
    at: Option<f64>,
) -> Vec<ActivityReport> {
    let clock = Arc::new(ManualClock::new());
    let monitor = ActivityMonitor::new(config, clock.clone());
    let mut latest: f64 = 0.0;

    for entry in entries {
        clock.set_secs(entry.seconds);
        latest = latest.max(entry.seconds);
        if is_channel(&entry.target) {
            monitor.on_message(&entry.target);
        } else {
            debug!("Skipping non-channel target {}", entry.target);
        }
    }

    clock.set_secs(at.unwrap_or(latest));

    let names: Vec<String> = if channels.is_empty() {
        monitor
            .registry()
            .snapshot(monitor.now())
            .into_iter()
            .map(|a| a.channel.to_string())
            .collect()
    } else {
        channels.to_vec()
    };

    names.iter().map(|name| monitor.report(name)).collect()
}
