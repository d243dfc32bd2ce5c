//! Logging Infrastructure
//!
//! Human-readable output on stderr, or daily-rolling files when a log
//! directory is configured. Stdout stays free for the totals JSON and
//! previews.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger at `info`
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
///
/// `log_level` accepts anything `EnvFilter` does (`debug`,
/// `kirana_billing=trace,info`). A missing log directory is created; if
/// that fails the logger falls back to stderr with a warning. A second call
/// is a no-op.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let mut unavailable = None;
    if let Some(dir) = log_dir {
        match prepare_log_dir(dir) {
            Ok(log_path) => {
                let file_appender = tracing_appender::rolling::daily(log_path, "kirana-print");
                let result = subscriber
                    .with_ansi(false)
                    .with_writer(file_appender)
                    .try_init();
                if result.is_err() {
                    tracing::debug!("Logger already initialized");
                }
                return;
            }
            Err(e) => unavailable = Some((dir, e)),
        }
    }

    if subscriber.with_writer(std::io::stderr).try_init().is_err() {
        tracing::debug!("Logger already initialized");
    }
    if let Some((dir, e)) = unavailable {
        tracing::warn!(log_dir = %dir, error = %e, "Log directory unavailable, logging to stderr");
    }
}

/// Create the log directory if it is missing
fn prepare_log_dir(dir: &str) -> std::io::Result<&Path> {
    let log_path = Path::new(dir);
    std::fs::create_dir_all(log_path)?;
    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        init_logger_with_file(Some("debug"), dir.path().to_str());
        init_logger();
        tracing::info!("logger initialized");
    }

    #[test]
    fn test_missing_log_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs").join("printer");
        let path = prepare_log_dir(nested.to_str().unwrap()).unwrap();
        assert!(path.is_dir());
    }

    #[test]
    fn test_log_dir_over_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        assert!(prepare_log_dir(file.to_str().unwrap()).is_err());
    }
}
