//! Rotalog - writes a stream of records into a rotating log file
//!
//! # Usage
//!
//! ```bash
//! # Defaults: try.log, no size limit, 1000 files per day
//! rotalog
//!
//! # From a config file, with overrides
//! rotalog --config configs/rotalog.toml --rotate-size 1 --max-files 3
//!
//! # Only the file, no stdout echo
//! rotalog --file /tmp/try.log --count 10 --no-console
//! ```

mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rotalog_config::{Config, LogLevel};
use rotalog_sink::{LockedSink, RotatingSink, RotationMode, SinkOptions};

/// Rotalog - writes a stream of records into a rotating log file
#[derive(Parser, Debug)]
#[command(name = "rotalog")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Active log file
    #[arg(short, long)]
    file: Option<String>,

    /// Size threshold in MB, <= 0 for unlimited
    #[arg(long, allow_negative_numbers = true)]
    rotate_size: Option<i64>,

    /// Files kept per day
    #[arg(long, allow_negative_numbers = true)]
    max_files: Option<i64>,

    /// Number of records to write
    #[arg(short = 'n', long, default_value_t = 100_000)]
    count: u64,

    /// Do not echo records to stdout
    #[arg(long)]
    no_console: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let when: RotationMode = config.rotation.when.parse()?;
    let options = SinkOptions::new(&config.rotation.log_file_name)
        .with_when(when)
        .with_rotate_size_mb(config.rotation.rotate_size)
        .with_max_file_number_per_day(config.rotation.max_file_number_per_day);
    let sink = RotatingSink::open(options)
        .with_context(|| format!("cannot open '{}'", config.rotation.log_file_name))?;
    let sink = LockedSink::new(sink);

    logging::init_logging(&config.log, sink.clone())?;

    for i in 0..cli.count {
        tracing::info!(target: "rotalog", "test...{i}");
    }
    tracing::info!(target: "rotalog", "Done");

    sink.sync().context("final sync failed")?;

    let metrics = sink.metrics_handle().snapshot();
    tracing::debug!(
        writes = metrics.writes,
        bytes = metrics.bytes_written,
        rotations = metrics.rotations,
        housekeeping_errors = metrics.housekeeping_errors,
        "finished"
    );

    Ok(())
}

/// Load the config file (or defaults) and apply command line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    apply_overrides(&mut config, cli)?;
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(level) = &cli.log_level {
        config.log.level = level.parse::<LogLevel>()?;
    }
    if let Some(file) = &cli.file {
        config.rotation.log_file_name.clone_from(file);
    }
    if let Some(size) = cli.rotate_size {
        config.rotation.rotate_size = size;
    }
    if let Some(max) = cli.max_files {
        config.rotation.max_file_number_per_day = max;
    }
    if cli.no_console {
        config.log.console = false;
    }
    Ok(())
}
