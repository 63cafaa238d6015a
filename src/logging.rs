//! Tracing setup: console (stderr) plus an appending plain-text log file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::error::AppError;

/// `RUST_LOG` wins over `level` when set.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Keep the returned guard alive until exit,
/// otherwise buffered file output is lost.
pub fn init(level: &str, log_file: &Path) -> Result<WorkerGuard, AppError> {
    let dir = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = log_file
        .file_name()
        .ok_or_else(|| AppError::new(1, format!("Invalid log file path: {}", log_file.display())))?;
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::new(1, format!("Failed to create log directory {}: {e}", dir.display()))
    })?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter(level));
    let file = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(filter(level));

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| AppError::new(1, format!("Failed to initialise logging: {e}")))?;

    Ok(guard)
}
