//! File logging setup.
//!
//! The interactive UI owns the terminal, so diagnostics go to a log file
//! under `${GPSLOG_HOME}/logs` instead of stderr. The `GPSLOG_LOG` env var
//! sets the filter (tracing `EnvFilter` syntax).

use std::fs;

use gpslog_core::config::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initializes file logging. Returns the appender guard; hold it for the
/// lifetime of the process so buffered lines are flushed on exit.
///
/// Logging is best-effort: if the logs directory cannot be created the
/// process runs without it.
pub fn init() -> Option<WorkerGuard> {
    let logs_dir = paths::logs_dir();
    if fs::create_dir_all(&logs_dir).is_err() {
        return None;
    }

    let appender = tracing_appender::rolling::daily(logs_dir, "gpslog.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env("GPSLOG_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}
