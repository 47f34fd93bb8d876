//! Tracing setup: console output plus an optional daily-rotated log file.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const LOG_FILE_NAME: &str = "souq.log";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for the rolling log file. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Level used when `RUST_LOG` is not set
    pub default_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            default_level: Level::INFO,
        }
    }
}

impl LoggingConfig {
    pub fn from_config(log_dir: Option<String>) -> Self {
        Self {
            log_dir: log_dir.map(PathBuf::from),
            ..Self::default()
        }
    }
}

/// Keeps the file appender worker alive. Dropping it flushes any
/// buffered log output.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

fn env_filter(default_level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()))
}

/// Initialize the global tracing subscriber.
///
/// Console output is always on. When a log directory is configured, a
/// daily-rotated `souq.log` is written there as well. `RUST_LOG`
/// controls the level for both outputs.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console_layer = fmt::layer()
        .with_target(true)
        .with_filter(env_filter(config.default_level));
    layers.push(Box::new(console_layer));

    let file_guard = if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;

        let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .with_filter(env_filter(config.default_level));
        layers.push(Box::new(file_layer));

        Some(guard)
    } else {
        None
    };

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
