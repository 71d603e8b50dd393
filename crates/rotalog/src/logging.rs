//! Tracing setup
//!
//! Records go to the rotating file through `LockedSink` and, optionally, to
//! stdout. The file layer drops the sink's own `rotalog_sink` events: they
//! are emitted while the sink lock is held, and writing them back into the
//! sink would deadlock.

use anyhow::Result;
use rotalog_config::{LogConfig, LogFormat};
use rotalog_sink::LockedSink;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the tracing subscriber for logging
pub fn init_logging(config: &LogConfig, sink: LockedSink) -> Result<()> {
    let level = config.level.as_str();
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);

    let filter = file_filter(level)?;
    let file_layer: BoxedLayer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(sink)
            .with_filter(filter)
            .boxed(),
        LogFormat::Console => fmt::layer()
            .with_ansi(false)
            .with_writer(sink)
            .with_filter(filter)
            .boxed(),
    };
    layers.push(file_layer);

    if config.console {
        let console_filter = EnvFilter::try_new(level)
            .or_else(|_| EnvFilter::try_new("info"))
            .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_filter(console_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    Ok(())
}

fn file_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(format!("{level},rotalog_sink=off"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))
}
