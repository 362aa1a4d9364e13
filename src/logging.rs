use crate::error::{Result, SnakeError};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Subscriber, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Where log output goes. Built by the binaries and handed to
/// [`build_subscriber`]; the library itself never installs a subscriber.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Write a DEBUG level trace to `debug_file`
    pub debug: bool,
    /// INFO and above
    pub log_file: Option<PathBuf>,
    pub debug_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: true,
            log_file: Some(PathBuf::from("log.log")),
            debug_file: Some(PathBuf::from("debug.log")),
        }
    }
}

// existing files are wiped so every run starts with a clean log
fn create_log_file(path: &Path) -> Result<Mutex<File>> {
    File::create(path)
        .map(Mutex::new)
        .map_err(|e| SnakeError::io(path, e))
}

/// Builds the subscriber described by `config`: stderr at WARN, the log file
/// at INFO and, when `debug` is set, the debug file at DEBUG.
pub fn build_subscriber(config: &LogConfig) -> Result<impl Subscriber + Send + Sync + 'static> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(LevelFilter::WARN);

    let log_layer = match &config.log_file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(create_log_file(path)?)
                .with_filter(LevelFilter::INFO),
        ),
        None => None,
    };

    let debug_layer = match (&config.debug_file, config.debug) {
        (Some(path), true) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(create_log_file(path)?)
                .with_filter(LevelFilter::DEBUG),
        ),
        _ => None,
    };

    Ok(tracing_subscriber::registry()
        .with(console)
        .with(log_layer)
        .with(debug_layer))
}

/// Installs the subscriber process-wide. Meant for binaries only.
pub fn init(config: &LogConfig) -> Result<()> {
    let subscriber = build_subscriber(config)?;
    if subscriber.try_init().is_err() {
        warn!("global tracing subscriber already installed, keeping it");
        return Ok(());
    }
    info!(
        debug = config.debug,
        "logger activated with debug {}",
        if config.debug { "ON" } else { "OFF" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_subscriber_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            debug: true,
            log_file: Some(dir.path().join("log.log")),
            debug_file: Some(dir.path().join("debug.log")),
        };

        let subscriber = build_subscriber(&config).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("only in the debug file");
            tracing::info!("in both files");
        });

        let log = std::fs::read_to_string(dir.path().join("log.log")).unwrap();
        let debug = std::fs::read_to_string(dir.path().join("debug.log")).unwrap();

        assert!(log.contains("in both files"));
        assert!(!log.contains("only in the debug file"));
        assert!(debug.contains("only in the debug file"));
        assert!(debug.contains("in both files"));
    }

    #[test]
    fn test_debug_off_skips_debug_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            debug: false,
            log_file: None,
            debug_file: Some(dir.path().join("debug.log")),
        };

        build_subscriber(&config).unwrap();
        assert!(!dir.path().join("debug.log").exists());
    }
}
