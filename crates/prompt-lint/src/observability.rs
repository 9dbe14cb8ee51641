//! Tracing setup for the CLI.
//!
//! Human-readable events go to stderr. When a log location is configured,
//! every event is also written as JSON lines through `tracing-appender`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Explicit log file path.
const LOG_PATH_ENV: &str = "PROMPT_LINT_LOG_PATH";
/// Directory for daily-rotated log files.
const LOG_DIR_ENV: &str = "PROMPT_LINT_LOG_DIR";
/// Daily log files are named `prompt-lint.<date>.jsonl`.
const LOG_FILE_PREFIX: &str = "prompt-lint";
const LOG_FILE_SUFFIX: &str = "jsonl";

/// Where log files go, if anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Write to exactly this file (no rotation).
    pub log_path: Option<PathBuf>,
    /// Write daily-rotated files into this directory.
    pub log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Read `PROMPT_LINT_LOG_PATH` and `PROMPT_LINT_LOG_DIR`, falling back to
    /// the config file's `log_dir`.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        let non_empty = |key: &str| {
            std::env::var_os(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            log_path: non_empty(LOG_PATH_ENV),
            log_dir: non_empty(LOG_DIR_ENV).or(config_log_dir),
        }
    }

    fn file_appender(&self) -> anyhow::Result<Option<RollingFileAppender>> {
        if let Some(path) = &self.log_path {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file = path
                .file_name()
                .and_then(|f| f.to_str())
                .with_context(|| format!("invalid log file path: {}", path.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(file)
                .build(dir)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            return Ok(Some(appender));
        }
        let Some(dir) = &self.log_dir else {
            return Ok(None);
        };
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix(LOG_FILE_SUFFIX)
            .build(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
        Ok(Some(appender))
    }
}

/// Filters for the stderr and file layers.
pub struct LogFilters {
    /// Filter for stderr output.
    pub console: EnvFilter,
    /// Filter for the JSON log file.
    pub file: EnvFilter,
}

/// Build the layer filters.
///
/// `-q` and `-v` win for stderr, then `RUST_LOG`, then `warn`. The log file
/// follows `RUST_LOG` when set, else the configured level.
pub fn env_filter(quiet: bool, verbose: u8, log_level: &str) -> LogFilters {
    let from_env = || EnvFilter::try_from_default_env().ok();
    let console = match (quiet, verbose) {
        (true, _) => EnvFilter::new("error"),
        (false, 1) => EnvFilter::new("debug"),
        (false, 2..) => EnvFilter::new("trace"),
        (false, 0) => from_env().unwrap_or_else(|| EnvFilter::new("warn")),
    };
    let file = from_env().unwrap_or_else(|| EnvFilter::new(log_level));
    LogFilters { console, file }
}

/// Install the global subscriber.
///
/// Returns the guard that flushes the file writer; keep it alive until exit.
pub fn init_observability(
    config: &ObservabilityConfig,
    filters: LogFilters,
) -> anyhow::Result<Option<WorkerGuard>> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(filters.console);

    let (file_layer, guard) = match config.file_appender()? {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(filters.file);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(guard)
}
