use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "tei-placenames.log";

/// Initializes the logging system with both console and file output.
///
/// The console layer writes to stderr so that stdout stays free for command
/// output such as `--summary-json`. The returned guard must be held until the
/// process exits; dropping it flushes the file writer.
#[must_use = "dropping the guard stops file logging"]
pub fn init_logging() -> WorkerGuard {
    let (non_blocking_writer, guard) = file_writer(Path::new(LOG_DIR));

    // Create a JSON layer for file logging
    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    // Create a formatted layer for console logging
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    // Respect RUST_LOG if set; otherwise info for this crate
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tei_placenames=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}

/// Non-blocking writer over a daily-rotated log file in `dir`.
fn file_writer(dir: &Path) -> (NonBlocking, WorkerGuard) {
    // Ensure logs directory exists
    let _ = fs::create_dir_all(dir);
    let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE);
    tracing_appender::non_blocking(file_appender)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_the_guard_flushes_buffered_lines() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, guard) = file_writer(dir.path());
        let subscriber = tracing_subscriber::fmt().json().with_writer(writer).finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("Pipeline failed: lookup failed");
        });
        drop(guard);

        let content: String = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| fs::read_to_string(entry.unwrap().path()).unwrap())
            .collect();
        assert!(content.contains("Pipeline failed: lookup failed"), "{content}");
    }
}
