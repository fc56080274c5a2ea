//! Logging for the client.
//!
//! The client writes its debug output to an optional [`Logger`] sink. With
//! no sink configured nothing is emitted. [`TracingLogger`] forwards to the
//! `tracing` ecosystem; the `init*` helpers set up a subscriber for
//! programs that do not install one themselves.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt as tracing_fmt, prelude::*};

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "targetprocess=info,warn";

/// A leveled logging sink.
pub trait Logger: Send + Sync {
    fn debug(&self, args: fmt::Arguments<'_>);
    fn info(&self, args: fmt::Arguments<'_>);
}

/// Forwards log lines to `tracing` under the `targetprocess` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(target: "targetprocess", "{}", args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "targetprocess", "{}", args);
    }
}

/// Initialize logging to stderr.
///
/// Configure the level via `RUST_LOG`, e.g. `RUST_LOG=targetprocess=debug`
/// to see every request URL and raw response.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn init() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Initialize logging to a daily rotating file in `dir`.
///
/// # Errors
///
/// Returns an error if:
/// - The log directory cannot be created
/// - A global subscriber is already set
pub fn init_file(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "targetprocess.log");

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(log_dir = %dir.display(), "Log directory");
    Ok(())
}

/// Platform-specific default log directory (`<data_local>/targetprocess/logs`).
pub fn log_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|base| base.join("targetprocess").join("logs"))
}
