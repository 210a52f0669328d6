//! Activity Service
//!
//! Drives the monitor from a stream of protocol lines:
//! - Channel messages are recorded, private messages ignored
//! - `!activity` queries are answered on the output writer
//! - A ticker logs the busiest channels and prunes idle ones if configured

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

use actmon_core::{ActivityMonitor, ActivityReport, DEFAULT_REPORT_INTERVAL_SECS};

use crate::{parse_activity_query, parse_line, IngestError};

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Interval between periodic reports
    pub report_interval: Duration,
    /// Channels listed per periodic report
    pub report_top: usize,
    /// Prune channels whose score falls below this on each report
    pub prune_below: Option<f64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            report_interval: Duration::from_secs(DEFAULT_REPORT_INTERVAL_SECS),
            report_top: 5,
            prune_below: None,
        }
    }
}

/// What happened to a single input line
#[derive(Debug, Clone)]
pub enum LineOutcome {
    /// A channel message was recorded
    Recorded,
    /// Not a channel message
    Ignored,
    /// Could not be parsed
    Malformed,
    /// A request for a report, sent to a channel or privately
    Query {
        /// Whether the query itself was recorded as channel activity
        recorded: bool,
        reply_to: String,
        report: ActivityReport,
    },
}

/// Counters accumulated over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub lines: u64,
    pub recorded: u64,
    pub ignored: u64,
    pub malformed: u64,
    pub queries: u64,
}

/// Ingestion loop around a shared monitor
pub struct ActivityService {
    monitor: Arc<ActivityMonitor>,
    config: ServiceConfig,
}

impl ActivityService {
    pub fn new(monitor: Arc<ActivityMonitor>, config: ServiceConfig) -> Self {
        Self { monitor, config }
    }

    pub fn monitor(&self) -> &Arc<ActivityMonitor> {
        &self.monitor
    }

    /// Process one protocol line
    pub fn handle_line(&self, line: &str) -> LineOutcome {
        let msg = match parse_line(line) {
            Ok(Some(msg)) => msg,
            Ok(None) => return LineOutcome::Ignored,
            Err(e) => {
                warn!("{}", e);
                return LineOutcome::Malformed;
            }
        };

        if msg.is_channel_message() {
            self.monitor.on_message(&msg.target);
        }

        let reply_to = if msg.is_channel_message() {
            Some(msg.target.as_str())
        } else {
            msg.nick()
        };

        match (parse_activity_query(&msg.text, &msg.target), reply_to) {
            (Some(channel), Some(reply_to)) => LineOutcome::Query {
                recorded: msg.is_channel_message(),
                reply_to: reply_to.to_string(),
                report: self.monitor.report(channel),
            },
            _ if msg.is_channel_message() => LineOutcome::Recorded,
            _ => LineOutcome::Ignored,
        }
    }

    /// Consume `reader` until EOF, writing query replies to `writer`
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> Result<IngestSummary, IngestError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut summary = IngestSummary::default();
        let period = self.config.report_interval;
        let mut ticker = interval_at(Instant::now() + period, period);

        info!(
            "Activity service started (decay constant {}s, report every {:?})",
            self.monitor.registry().config().decay_constant,
            period
        );

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    summary.lines += 1;

                    match self.handle_line(&line) {
                        LineOutcome::Recorded => summary.recorded += 1,
                        LineOutcome::Ignored => summary.ignored += 1,
                        LineOutcome::Malformed => summary.malformed += 1,
                        LineOutcome::Query { recorded, reply_to, report } => {
                            if recorded {
                                summary.recorded += 1;
                            }
                            summary.queries += 1;
                            let reply = format!("PRIVMSG {} :{}\r\n", reply_to, report);
                            writer.write_all(reply.as_bytes()).await?;
                            writer.flush().await?;
                        }
                    }
                }
                _ = ticker.tick() => self.periodic_report(),
            }
        }

        info!(
            "Activity service stopped: {} lines, {} recorded, {} ignored, {} malformed",
            summary.lines, summary.recorded, summary.ignored, summary.malformed
        );
        Ok(summary)
    }

    /// Log the busiest channels and prune idle ones
    pub fn periodic_report(&self) {
        let registry = self.monitor.registry();
        let now = self.monitor.now();

        for activity in registry.snapshot(now).iter().take(self.config.report_top) {
            info!(
                "{}: score {:.4}, {:.4} msg/min",
                activity.channel,
                activity.score,
                activity.rate * 60.0
            );
        }

        if let Some(min_score) = self.config.prune_below {
            let removed = registry.prune(now, min_score);
            if removed > 0 {
                debug!("Pruned {} idle channels", removed);
            }
        }
    }
}
