//! Rolling file logs under `<data root>/logs`.
//!
//! Logging is set up once per process. Nothing is written to the terminal,
//! so log output never interferes with the TUI.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "blt";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    Level(String),
    #[error("failed to create log directory `{0}`: {1}")]
    Directory(PathBuf, std::io::Error),
    #[error("failed to start logger: {0}")]
    Backend(#[from] flexi_logger::FlexiLoggerError),
    #[error("logging already initialized at `{0}`")]
    AlreadyInitialized(PathBuf),
}

/// Start file logging at `level` into `log_dir`.
///
/// Calling again with the same directory is a no-op; a different directory is rejected.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;

    if let Some(state) = LOGGING_STATE.get() {
        if state.log_dir == log_dir {
            return Ok(());
        }
        return Err(LoggingError::AlreadyInitialized(state.log_dir.clone()));
    }

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, LoggingError> {
        std::fs::create_dir_all(log_dir)
            .map_err(|err| LoggingError::Directory(log_dir.to_path_buf(), err))?;

        let logger = Logger::try_with_str(level)?
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
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()?;

        install_panic_hook_once();

        info!(
            "event=app_start module=logging status=ok platform={} version={} level={} log_dir={}",
            std::env::consts::OS,
            env!("CARGO_PKG_VERSION"),
            level,
            log_dir.display()
        );

        Ok(LoggingState {
            log_dir: log_dir.to_path_buf(),
            _logger: logger,
        })
    })?;

    if state.log_dir != log_dir {
        return Err(LoggingError::AlreadyInitialized(state.log_dir.clone()));
    }
    Ok(())
}

pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) { "debug" } else { "info" }
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::Level(other.to_string())),
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.get().is_some() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=logging status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));

    let _ = PANIC_HOOK_INSTALLED.set(());
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };
    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(matches!(normalize_level("loud"), Err(LoggingError::Level(_))));
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn init_is_idempotent_and_rejects_a_second_directory() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let first_logs = first.path().join("logs");

        init_logging("info", &first_logs).unwrap();
        init_logging("info", &first_logs).unwrap();
        let err = init_logging("info", &second.path().join("logs")).unwrap_err();
        match err {
            LoggingError::AlreadyInitialized(active) => assert_eq!(active, first_logs),
            other => panic!("unexpected error: {other}"),
        }
        assert!(first_logs.is_dir());
    }
}
