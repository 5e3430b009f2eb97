//! Tracing setup
//!
//! Logs to stderr and to a timestamped file under `logs/`. The returned
//! guard must be held for the life of the process so buffered file output
//! is flushed on exit.

use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = "logs";

/// Initialize tracing. Returns `None` for the guard if the log file could
/// not be created; stderr logging still works in that case.
pub fn init() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scorecast=info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match file_writer() {
        Some((writer, guard)) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

fn file_writer() -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    fs::create_dir_all(LOG_DIR).ok()?;
    let filename = format!("{}.log", chrono::Local::now().format("%Y-%m-%d_%H-%M-%S"));
    let file = fs::File::create(Path::new(LOG_DIR).join(filename)).ok()?;
    Some(tracing_appender::non_blocking(file))
}
