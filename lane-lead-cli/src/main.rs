//! Lane Lead Tracker CLI Application
//!
//! Command-line host for the lane-lead-tracker library. It stands in for the
//! vehicle's cycle loop during bench testing:
//! - Loads tracker configuration (TOML) and command-line overrides
//! - Replays recorded radar cycles (JSON lines) through the tracker
//! - Writes the per-cycle output signals as JSON lines
//! - Emits periodic diagnostics through the logger

use anyhow::{Context, Result};
use clap::Parser;
use lane_lead_tracker::{AdjacentLane, DiagnosticsReporter, LeadTracker};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

mod config;
mod replay;

use config::{AppConfig, Overrides};
use replay::{ReplayOptions, ReplayStats};

/// Lane Lead Tracker - Replay radar cycles through the adjacent-lane lead tracker
#[derive(Parser, Debug)]
#[command(name = "lane-lead-cli")]
#[command(about = "Replay radar track cycles and emit adjacent-lane lead signals", long_about = None)]
#[command(version)]
struct Args {
    /// Recorded cycles, one JSON object per line (default: stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file for encoded signals (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Cycles a lead is held after its track disappears
    #[arg(long, value_name = "COUNT")]
    hold_cycles: Option<u32>,

    /// Minimum time between diagnostics reports
    #[arg(long, value_name = "MS")]
    diagnostics_interval_ms: Option<u64>,

    /// Pace replay at this cycle period instead of running flat out
    #[arg(long, value_name = "MS")]
    period_ms: Option<u64>,

    /// Maximum number of cycles to replay
    #[arg(long, value_name = "COUNT")]
    max_cycles: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Lane Lead Tracker CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using tracker library v{}", lane_lead_tracker::VERSION);

    let overrides = Overrides {
        hold_cycles: args.hold_cycles,
        diagnostics_interval_ms: args.diagnostics_interval_ms,
        period_ms: args.period_ms,
        max_cycles: args.max_cycles,
    };

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            let mut loaded = config::load_config(path)?;
            loaded.apply(&overrides);
            loaded
        }
        None => AppConfig::from_overrides(&overrides)?,
    };
    app_config.validate()?;
    log::debug!("Configuration loaded successfully");

    let mut tracker =
        LeadTracker::new(app_config.tracker.clone()).context("Failed to start tracker")?;
    let mut reporter = DiagnosticsReporter::new(&app_config.diagnostics);

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open input: {:?}", path))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output: {:?}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let options = ReplayOptions {
        period: app_config.replay.period_ms.map(Duration::from_millis),
        max_cycles: app_config.replay.max_cycles,
    };

    let stats = replay::run_replay(reader, writer, &mut tracker, &mut reporter, &options)
        .context("Replay failed")?;

    if !args.quiet {
        print_summary(&tracker, &stats);
    }

    Ok(())
}

/// Print the replay summary to stderr (stdout carries the signal stream)
fn print_summary(tracker: &LeadTracker, stats: &ReplayStats) {
    let elapsed = stats.finished_at - stats.started_at;

    eprintln!("═══════════════════════════════════════════════");
    eprintln!("  Lane Lead Tracker - Replay Summary");
    eprintln!("═══════════════════════════════════════════════");
    eprintln!("  Started:   {}", stats.started_at.format("%Y-%m-%d %H:%M:%S%.3f UTC"));
    eprintln!("  Duration:  {} ms", elapsed.num_milliseconds());
    eprintln!("  Cycles:    {}", stats.cycles);
    eprintln!("  Malformed: {}", stats.malformed_lines);
    eprintln!("  Rejected:  {}", stats.rejected_cycles);
    eprintln!("  Overruns:  {}", stats.overrun_cycles);
    eprintln!("  Resets:    {}", stats.resets);
    eprintln!("  Reports:   {}", stats.reports);

    for (lane, present) in [
        (AdjacentLane::Left, stats.left_present),
        (AdjacentLane::Right, stats.right_present),
    ] {
        let names = tracker.encoder(lane).signal_names();
        eprintln!(
            "  {:<5} lead present in {} cycle(s) [{}]",
            lane,
            present,
            names.join(", ")
        );
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
