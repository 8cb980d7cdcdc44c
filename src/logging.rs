use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;
use crate::error::{AppError, AppResult};

/// Overrides the configured filter, e.g. `PVJ_LOG=pvj::dispatch=debug`.
pub const LOG_FILTER_ENV: &str = "PVJ_LOG";

/// Installs the global subscriber writing to a log file. The terminal
/// belongs to the UI, so nothing is ever logged to stdout or stderr.
pub fn init_file_logging(config: &LogConfig, override_path: Option<&Path>) -> AppResult<PathBuf> {
    let log_path = override_path
        .map(Path::to_path_buf)
        .or_else(|| config.file.clone())
        .unwrap_or_else(default_log_path);
    if let Some(parent) = log_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| {
            AppError::io_with_context(
                err,
                format!("failed to create log directory {}", parent.display()),
            )
        })?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|err| {
            AppError::io_with_context(
                err,
                format!("failed to open log file {}", log_path.display()),
            )
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(resolve_filter(&config.filter))
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init()
        .map_err(|err| AppError::invalid_argument(format!("failed to install logger: {err}")))?;

    Ok(log_path)
}

fn resolve_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn default_log_path() -> PathBuf {
    if let Some(state) = std::env::var_os("XDG_STATE_HOME")
        && !state.is_empty()
    {
        return PathBuf::from(state).join("pvj").join("pvj.log");
    }
    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return PathBuf::from(home)
            .join(".local")
            .join("state")
            .join("pvj")
            .join("pvj.log");
    }
    std::env::temp_dir().join("pvj.log")
}
