//! Core logging bootstrap.
//!
//! # Responsibility
//! - Initialize file-based rolling logs exactly once per process.
//! - Record panics (including staged-edit precondition failures) in the log.
//!
//! # Invariants
//! - Logging init is idempotent for the same configuration.
//! - Logging initialization must not panic.
//! - Re-initialization with a different level or directory is rejected.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "notemap";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    config: LoggingConfig,
    _logger: LoggerHandle,
}

/// Errors from logging configuration and startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    EmptyLogDir,
    RelativeLogDir(String),
    /// Logging is already active with another configuration.
    Conflict {
        active: LoggingConfig,
        requested: LoggingConfig,
    },
    /// Directory creation or logger backend startup failed.
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::EmptyLogDir => write!(f, "log_dir cannot be empty"),
            Self::RelativeLogDir(dir) => {
                write!(f, "log_dir must be an absolute path, got `{dir}`")
            }
            Self::Conflict { active, requested } => write!(
                f,
                "logging already initialized with {active}; refusing to switch to {requested}"
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
        }
    }
}

impl Error for LoggingError {}

/// Normalized logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: &'static str,
    pub log_dir: PathBuf,
}

impl LoggingConfig {
    /// Parses user-provided level and directory values.
    ///
    /// # Errors
    /// - `UnsupportedLevel` for anything outside `trace|debug|info|warn|error`.
    /// - `EmptyLogDir` / `RelativeLogDir` when `log_dir` is not absolute.
    pub fn parse(level: &str, log_dir: &str) -> Result<Self, LoggingError> {
        Ok(Self {
            level: normalize_level(level)?,
            log_dir: normalize_log_dir(log_dir)?,
        })
    }
}

impl Display for LoggingConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "level `{}` at `{}`", self.level, self.log_dir.display())
    }
}

/// Initializes core logging with level and directory.
///
/// # Errors
/// - Returns an error when the configuration does not parse.
/// - Returns `Conflict` when logging is already active with another
///   configuration.
/// - Returns `Backend` when the directory or logger backend cannot be set up.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let requested = LoggingConfig::parse(level, log_dir)?;
    let state = LOGGING_STATE.get_or_try_init(|| start_logger(&requested))?;

    if state.config != requested {
        return Err(LoggingError::Conflict {
            active: state.config.clone(),
            requested,
        });
    }
    Ok(())
}

/// Returns the active logging configuration, if any.
pub fn logging_status() -> Option<LoggingConfig> {
    LOGGING_STATE.get().map(|state| state.config.clone())
}

/// Returns the default log level for current build mode.
///
/// - `debug` builds -> `debug`
/// - `release` builds -> `info`
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(config: &LoggingConfig) -> Result<LoggingState, LoggingError> {
    std::fs::create_dir_all(&config.log_dir).map_err(|err| {
        LoggingError::Backend(format!(
            "cannot create log directory `{}`: {err}",
            config.log_dir.display()
        ))
    })?;

    let logger = Logger::try_with_str(config.level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(config.log_dir.as_path())
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
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook_once();
    info!(
        "event=core_init module=core status=ok version={} build_mode={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        build_mode(),
        config.level,
        config.log_dir.display()
    );

    Ok(LoggingState {
        config: config.clone(),
        _logger: logger,
    })
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err(LoggingError::EmptyLogDir);
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(LoggingError::RelativeLogDir(trimmed.to_string()));
    }
    Ok(path.to_path_buf())
}

fn build_mode() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Payloads may carry note text; keep them single-line and bounded.
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            panic_payload_summary(panic_info)
        );
        previous_hook(panic_info);
    }));
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
    use super::{
        default_log_level, init_logging, logging_status, normalize_level, sanitize_message,
        LoggingConfig, LoggingError,
    };

    #[test]
    fn default_log_level_is_accepted_by_parse() {
        let config = LoggingConfig::parse(default_log_level(), "/tmp/notemap-logs").unwrap();
        assert_eq!(config.level, default_log_level());
    }

    #[test]
    fn config_parse_normalizes_level() {
        let config = LoggingConfig::parse(" WARNING ", "/tmp/notemap-logs").unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(normalize_level("INFO").unwrap(), "info");
    }

    #[test]
    fn config_parse_rejects_bad_values() {
        assert_eq!(
            LoggingConfig::parse("loud", "/tmp/x").unwrap_err(),
            LoggingError::UnsupportedLevel("loud".to_string())
        );
        assert_eq!(
            LoggingConfig::parse("info", "  ").unwrap_err(),
            LoggingError::EmptyLogDir
        );
        assert!(matches!(
            LoggingConfig::parse("info", "logs/dev"),
            Err(LoggingError::RelativeLogDir(_))
        ));
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn init_logging_is_idempotent_for_same_config_and_rejects_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap().to_string();
        let other_str = other.path().to_str().unwrap().to_string();

        init_logging("info", &dir_str).unwrap();
        init_logging("info", &dir_str).unwrap();

        let level_error = init_logging("debug", &dir_str).unwrap_err();
        assert!(matches!(level_error, LoggingError::Conflict { .. }));
        assert!(level_error.to_string().contains("refusing to switch"));

        let dir_error = init_logging("info", &other_str).unwrap_err();
        assert!(matches!(dir_error, LoggingError::Conflict { .. }));

        let active = logging_status().unwrap();
        assert_eq!(active.level, "info");
        assert_eq!(active.log_dir, dir.path());
    }
}
