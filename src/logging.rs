//! File-based tracing setup.
//!
//! The interactive shell owns the terminal, so diagnostics go to a daily
//! rolling file under the data directory instead of stdout.

use crate::modules::storage::settings::data_dir;
use crate::utils::APP_NAME;
use std::fs;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "playdeck=debug,warn";

/// Directory holding `playdeck.YYYY-MM-DD` log files.
pub fn log_dir() -> PathBuf {
    data_dir()
        .map(|dir| dir.join("logs"))
        .unwrap_or_else(|| PathBuf::from(".logs"))
}

/// Initialize the logging system.
///
/// The level is controlled by `RUST_LOG`; without it this crate logs at
/// debug and everything else at warn.
pub fn init_logging() -> anyhow::Result<()> {
    let log_dir = log_dir();
    fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, APP_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The writer flushes on guard drop; keep it for the whole process.
    Box::leak(Box::new(guard));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(dir = %log_dir.display(), "logging initialized");
    Ok(())
}
