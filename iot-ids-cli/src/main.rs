//! IoT IDS Dashboard CLI Application
//!
//! Command-line front end for the iot-ids-core tracker. It adds:
//! - TOML configuration with command-line overrides
//! - Interactive commands on stdin (refresh, threshold, interval, auto refresh, quit)
//! - Text dashboard and JSON-lines rendering of every tick

use anyhow::{bail, Result};
use clap::Parser;
use iot_ids_core::{Driver, EventTracker, SharedTracker, SimulatedGenerator};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

mod config;
mod input;
mod report;

use config::AppConfig;
use report::OutputFormat;

/// IoT IDS Dashboard - simulated intrusion-detection feed for IoT traffic
#[derive(Parser, Debug)]
#[command(name = "iot-ids")]
#[command(about = "Simulated intrusion-detection dashboard for IoT traffic", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Confidence threshold for alerts, in [0, 1]
    #[arg(short, long, value_name = "VALUE")]
    threshold: Option<f64>,

    /// Number of events kept in the detection feed
    #[arg(long, value_name = "COUNT")]
    capacity: Option<usize>,

    /// Seconds between automatic refreshes
    #[arg(short, long, value_name = "SECS")]
    interval: Option<f64>,

    /// Seed for a reproducible detection stream
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Stop after this many ticks
    #[arg(long, value_name = "COUNT")]
    ticks: Option<u64>,

    /// Start with automatic refresh disabled (refresh with `r`)
    #[arg(long)]
    manual: bool,

    /// Do not read commands from stdin
    #[arg(long)]
    no_input: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Rows shown in the detection feed (text format)
    #[arg(long, value_name = "COUNT", default_value_t = 10)]
    rows: usize,

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

    log::info!("IoT IDS Dashboard v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using tracker library v{}", iot_ids_core::VERSION);

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    apply_overrides(&args, &mut config);
    config.validate()?;

    run_dashboard(&args, &config)
}

/// Command-line flags win over the configuration file
fn apply_overrides(args: &Args, config: &mut AppConfig) {
    let settings = &mut config.tracker.settings;
    if let Some(threshold) = args.threshold {
        settings.confidence_threshold = threshold;
    }
    if let Some(capacity) = args.capacity {
        settings.log_capacity = capacity;
    }
    if let Some(interval) = args.interval {
        settings.refresh_interval_secs = interval;
    }
    if let Some(seed) = args.seed {
        config.generator.seed = Some(seed);
    }
    if args.manual {
        config.tracker.auto_refresh = false;
    }
}

/// Wire generator, tracker and driver together and render every tick
fn run_dashboard(args: &Args, config: &AppConfig) -> Result<()> {
    if !config.tracker.auto_refresh && args.no_input {
        bail!("Manual refresh needs stdin commands; drop --no-input or enable auto refresh");
    }

    let settings = &config.tracker.settings;
    let generator_config = config.generator.generator_config()?;
    let generator = match config.generator.seed {
        Some(seed) => SimulatedGenerator::from_seed(&generator_config, seed)?,
        None => SimulatedGenerator::from_entropy(&generator_config)?,
    };

    let tracker = SharedTracker::new(EventTracker::from_config(settings)?);
    let mut driver =
        Driver::new(tracker, generator, settings)?.with_auto_refresh(config.tracker.auto_refresh);

    let (tx, rx) = mpsc::channel();
    if args.no_input {
        // No sender left: the timer runs until the tick limit or Ctrl-C
        drop(tx);
    } else {
        if !args.quiet {
            eprintln!("{}", input::HELP);
        }
        thread::spawn(move || input::forward_commands(io::stdin().lock(), tx));
    }

    let stdout = io::stdout();
    let mut write_error = None;
    driver.run(rx, args.ticks, |tick| {
        if write_error.is_some() || args.quiet {
            return;
        }
        let result = report::render(tick, args.format, args.rows).and_then(|frame| {
            let mut out = stdout.lock();
            writeln!(out, "{}", frame)?;
            out.flush()?;
            Ok(())
        });
        if let Err(e) = result {
            write_error = Some(e);
        }
    });

    if let Some(e) = write_error {
        return Err(e);
    }

    let stats = driver.stats();
    log::info!(
        "Session finished: {} ticks ({} timer, {} manual), {} rejected commands",
        stats.total_ticks(),
        stats.timer_ticks,
        stats.manual_ticks,
        stats.rejected_commands
    );

    Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_config() {
        let args = Args::parse_from([
            "iot-ids",
            "--threshold",
            "0.95",
            "--capacity",
            "20",
            "--seed",
            "9",
            "--manual",
        ]);
        let mut config = AppConfig::default();
        apply_overrides(&args, &mut config);

        assert_eq!(config.tracker.settings.confidence_threshold, 0.95);
        assert_eq!(config.tracker.settings.log_capacity, 20);
        assert_eq!(config.tracker.settings.refresh_interval_secs, 3.0);
        assert_eq!(config.generator.seed, Some(9));
        assert!(!config.tracker.auto_refresh);
    }

    #[test]
    fn test_manual_without_input_rejected() {
        let args = Args::parse_from(["iot-ids", "--manual", "--no-input"]);
        let mut config = AppConfig::default();
        apply_overrides(&args, &mut config);

        assert!(run_dashboard(&args, &config).is_err());
    }

    #[test]
    fn test_headless_run_with_tick_limit() {
        let args = Args::parse_from([
            "iot-ids", "--no-input", "--quiet", "--ticks", "3", "--interval", "0.01", "--seed", "1",
        ]);
        let mut config = AppConfig::default();
        apply_overrides(&args, &mut config);

        assert!(run_dashboard(&args, &config).is_ok());
    }

    #[test]
    fn test_args_format_flag() {
        let args = Args::parse_from(["iot-ids", "--format", "json"]);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.rows, 10);
    }
}
