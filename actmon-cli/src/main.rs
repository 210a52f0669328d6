//! actmon CLI
//!
//! Per-channel activity monitoring with exponentially decaying counters.

mod replay;
mod simulate;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use actmon_core::{ActivityConfig, ActivityMonitor, DEFAULT_DECAY_CONSTANT, DEFAULT_REPORT_INTERVAL_SECS};
use actmon_runtime::{ActivityService, ServiceConfig};

#[derive(Parser)]
#[command(name = "actmon")]
#[command(author, version, about = "actmon: channel activity monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1", global = true)]
    verbose: u8,

    /// Decay constant in seconds (half-life is ln 2 times this)
    #[arg(long, env = "ACTMON_DECAY_CONSTANT", default_value_t = DEFAULT_DECAY_CONSTANT, global = true)]
    decay_constant: f64,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read IRC protocol lines from stdin and track channel activity
    Watch {
        /// Seconds between busiest-channel reports
        #[arg(long, default_value_t = DEFAULT_REPORT_INTERVAL_SECS)]
        report_interval: u64,

        /// Channels listed per report
        #[arg(long, default_value = "5")]
        top: usize,

        /// Forget channels whose score drops below this value
        #[arg(long)]
        prune_below: Option<f64>,
    },

    /// Replay a `<seconds> <target>` log and report activity
    Replay {
        /// Log file to replay
        file: PathBuf,

        /// Channels to report on (default: every channel seen)
        #[arg(short, long)]
        channel: Vec<String>,

        /// Report as of this many seconds (default: last timestamp)
        #[arg(long)]
        at: Option<f64>,
    },

    /// Feed synthetic Poisson traffic and compare the estimate to the true rate
    Simulate {
        /// True event rate in events per second
        #[arg(short, long, default_value = "1.0")]
        rate: f64,

        /// Simulated duration in seconds
        #[arg(short, long, default_value = "600")]
        duration: f64,

        /// Seconds between samples (default: one decay constant)
        #[arg(long)]
        step: Option<f64>,

        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the half-life for the configured decay constant
    HalfLife,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let config = ActivityConfig::new(cli.decay_constant)
        .context("invalid --decay-constant / ACTMON_DECAY_CONSTANT")?;

    match cli.command {
        Commands::Watch {
            report_interval,
            top,
            prune_below,
        } => {
            if report_interval == 0 {
                bail!("--report-interval must be at least 1 second");
            }
            let service_config = ServiceConfig {
                report_interval: Duration::from_secs(report_interval),
                report_top: top,
                prune_below,
            };
            run_watch(config, service_config, cli.json).await?;
        }
        Commands::Replay { file, channel, at } => {
            run_replay(config, &file, &channel, at, cli.json)?;
        }
        Commands::Simulate {
            rate,
            duration,
            step,
            seed,
        } => {
            run_simulate(config, rate, duration, step, seed, cli.json)?;
        }
        Commands::HalfLife => {
            let half_life = config.half_life().as_secs_f64();
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "decay_constant": config.decay_constant,
                        "half_life": half_life,
                    })
                );
            } else {
                println!(
                    "Decay constant {}s, half-life {:.3}s",
                    config.decay_constant, half_life
                );
            }
        }
    }

    Ok(())
}

async fn run_watch(config: ActivityConfig, service_config: ServiceConfig, json: bool) -> Result<()> {
    let monitor = Arc::new(ActivityMonitor::with_system_clock(config));
    let service = ActivityService::new(monitor, service_config);

    let stdin = BufReader::new(tokio::io::stdin());
    let summary = service.run(stdin, tokio::io::stdout()).await?;

    let snapshot = service.monitor().registry().snapshot(service.monitor().now());
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "lines": summary.lines,
                "recorded": summary.recorded,
                "ignored": summary.ignored,
                "malformed": summary.malformed,
                "queries": summary.queries,
                "channels": snapshot,
            }))?
        );
    } else {
        eprintln!(
            "{} lines, {} recorded, {} ignored, {} malformed",
            summary.lines, summary.recorded, summary.ignored, summary.malformed
        );
    }

    Ok(())
}

fn run_replay(
    config: ActivityConfig,
    file: &Path,
    channels: &[String],
    at: Option<f64>,
    json: bool,
) -> Result<()> {
    let input = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let entries = replay::parse_log(&input)?;
    let reports = replay::replay(config, &entries, channels, at);

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if reports.is_empty() {
        println!("No channel activity in {}", file.display());
    } else {
        for report in &reports {
            println!("{}", report);
        }
    }

    Ok(())
}

fn run_simulate(
    config: ActivityConfig,
    rate: f64,
    duration: f64,
    step: Option<f64>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let step = step.unwrap_or(config.decay_constant);
    for (name, value) in [("--rate", rate), ("--duration", duration), ("--step", step)] {
        if !value.is_finite() || value <= 0.0 {
            bail!("{} must be a positive number, got {}", name, value);
        }
    }

    let sim = simulate::simulate(config, rate, duration, step, seed);

    if json {
        println!("{}", serde_json::to_string_pretty(&sim)?);
        return Ok(());
    }

    println!("{:>10}  {:>12}  {:>12}", "t (s)", "score", "msg/sec");
    for sample in &sim.samples {
        println!(
            "{:>10.1}  {:>12.4}  {:>12.4}",
            sample.seconds, sample.score, sample.rate
        );
    }
    println!();
    println!("True rate:      {:.4} msg/sec", sim.true_rate);
    println!(
        "Observed rate:  {:.4} msg/sec ({} events in {}s)",
        sim.observed_rate, sim.events, sim.duration
    );
    println!("Estimated rate: {:.4} msg/sec", sim.estimated_rate);

    Ok(())
}
