//! File logging for the `mf` binary.
//!
//! Logs go to `<data dir>/logs/mindflow*.log`, rotated by size. Messages
//! are single-line `event=... key=value` records so they stay greppable.
//! Initialization happens at most once per process; later calls are no-ops.

use std::path::Path;
use std::sync::OnceLock;

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::info;

/// Overrides the configured level when set
pub const LOG_LEVEL_ENV: &str = "MINDFLOW_LOG";

const LOG_FILE_BASENAME: &str = "mindflow";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Error type for logger setup
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error|off")]
    UnsupportedLevel(String),
    #[error("could not create log directory: {0}")]
    IoError(#[from] std::io::Error),
    #[error("could not start logger: {0}")]
    Backend(#[from] FlexiLoggerError),
}

/// Start file logging under `log_dir` at `level`.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let level = normalize_level(level)?;
    std::fs::create_dir_all(log_dir)?;

    let handle = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::Direct)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    if LOGGER.set(handle).is_ok() {
        info!(
            "event=logging_init status=ok level={} version={}",
            level,
            env!("CARGO_PKG_VERSION")
        );
    }
    Ok(())
}

/// Pick the effective level: the environment override wins over config.
pub fn effective_level(env_level: Option<&str>, config_level: &str) -> String {
    match env_level.map(str::trim) {
        Some(level) if !level.is_empty() => level.to_string(),
        _ => config_level.to_string(),
    }
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}
