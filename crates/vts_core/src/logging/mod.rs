//! Logging infrastructure.
//!
//! Everything in the crate logs through `tracing` macros. This module
//! installs the global subscriber:
//! - [`init_tracing`] writes to stderr
//! - [`init_tracing_to_dir`] additionally writes a log file
//! - [`init_from_settings`] picks one of them from the `[logging]` section
//!
//! Both respect RUST_LOG and fall back to the given [`LogLevel`].
//!
//! # Example
//!
//! ```no_run
//! use vts_core::logging::{init_tracing_to_dir, log_file_name, LogLevel};
//!
//! // Keep the guard alive until exit so buffered lines are flushed
//! let _guard = init_tracing_to_dir(LogLevel::Debug, ".logs", &log_file_name("vts")).unwrap();
//! tracing::info!("Resolving disc");
//! ```

mod types;

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub use types::LogLevel;

use crate::config::LoggingSettings;

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup. Later calls leave the
/// installed subscriber in place.
pub fn init_tracing(default_level: LogLevel) {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(env_filter(default_level))
        .try_init();
}

/// Like [`init_tracing`], also appending to `dir/file_name`.
///
/// File output goes through a non-blocking writer; lines are flushed
/// while the returned guard is alive and when it is dropped.
pub fn init_tracing_to_dir(
    default_level: LogLevel,
    dir: impl AsRef<Path>,
    file_name: &str,
) -> io::Result<WorkerGuard> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(env_filter(default_level))
        .try_init()
        .map_err(io::Error::other)?;

    Ok(guard)
}

/// Initialize tracing from the `[logging]` settings.
///
/// With `file_output` a timestamped log file is created in `logs_folder`
/// and its guard returned.
pub fn init_from_settings(
    settings: &LoggingSettings,
    logs_folder: impl AsRef<Path>,
) -> io::Result<Option<WorkerGuard>> {
    if !settings.file_output {
        init_tracing(settings.level);
        return Ok(None);
    }

    init_tracing_to_dir(settings.level, logs_folder, &log_file_name("vts")).map(Some)
}

/// Log file name carrying the current local time, e.g.
/// `vts_20240131_142501.log`.
pub fn log_file_name(prefix: &str) -> String {
    format!("{}_{}.log", prefix, chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()))
}
