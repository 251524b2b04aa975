//! Logging setup
//!
//! Provides up to two outputs:
//! - Console: stderr, `warn` by default so log lines don't draw over dialog
//!   boxes; override with `RESTIC_EZ_LOG` (an `EnvFilter` directive)
//! - File: DEBUG level with daily rotation, enabled by `RESTIC_EZ_LOG_DIR`

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub const LOG_FILTER_ENV: &str = "RESTIC_EZ_LOG";
pub const LOG_DIR_ENV: &str = "RESTIC_EZ_LOG_DIR";

const LOG_FILE_PREFIX: &str = "restic-ez";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for log files, no file output when `None`
    pub log_directory: Option<PathBuf>,
    /// Filter directive for console output
    pub console_filter: String,
    /// Log level for file output
    pub file_level: Level,
    /// Maximum number of log files to keep
    pub max_files: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_directory: None,
            console_filter: "warn".to_string(),
            file_level: Level::DEBUG,
            max_files: 10,
        }
    }
}

impl LoggingConfig {
    /// Read settings from `RESTIC_EZ_LOG` and `RESTIC_EZ_LOG_DIR`
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(LOG_FILTER_ENV).ok(),
            std::env::var_os(LOG_DIR_ENV).map(PathBuf::from),
        )
    }

    fn from_values(filter: Option<String>, log_directory: Option<PathBuf>) -> Self {
        let defaults = Self::default();
        Self {
            log_directory: log_directory
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| expand_tilde(&p)),
            console_filter: filter
                .filter(|f| !f.trim().is_empty())
                .unwrap_or(defaults.console_filter),
            ..defaults
        }
    }
}

/// Initialize logging
///
/// Returns a guard that must be kept alive for the duration of the program.
/// When the guard is dropped, any remaining logs are flushed to disk.
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard> {
    let (file_layer, file_guard) = match &config.log_directory {
        Some(log_dir) => {
            fs::create_dir_all(log_dir)
                .with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;

            let file_appender = RollingFileAppender::new(
                Rotation::DAILY,
                log_dir,
                format!("{}.log", LOG_FILE_PREFIX),
            );
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_span_events(FmtSpan::NONE)
                .with_filter(level_filter(config.file_level));

            cleanup_old_logs(log_dir, config.max_files)?;
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_filter = EnvFilter::try_new(&config.console_filter)
        .with_context(|| format!("Invalid {} filter: {}", LOG_FILTER_ENV, config.console_filter))?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_level(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

/// Create a level filter for the file layer
fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::new(format!("restic_ez={}", level))
}

/// Expand tilde (~) in path to home directory
fn expand_tilde(path: &Path) -> PathBuf {
    crate::config::expand_tilde(path)
}

/// Cleanup old log files, keeping only the most recent N files
fn cleanup_old_logs(log_dir: &Path, max_files: u32) -> Result<()> {
    let mut log_files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with(LOG_FILE_PREFIX)
        })
        .collect();

    // Sort by modification time (newest first)
    log_files.sort_by(|a, b| {
        let a_time = a.metadata().and_then(|m| m.modified()).ok();
        let b_time = b.metadata().and_then(|m| m.modified()).ok();
        b_time.cmp(&a_time)
    });

    // Remove files beyond the limit
    for file in log_files.into_iter().skip(max_files as usize) {
        if let Err(e) = fs::remove_file(file.path()) {
            tracing::warn!("Failed to remove old log file {:?}: {}", file.path(), e);
        } else {
            tracing::debug!("Removed old log file: {:?}", file.path());
        }
    }

    Ok(())
}

/// Guard that keeps the logging system alive
///
/// When dropped, flushes any remaining logs to disk.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}
