//! Logging setup.
//!
//! `RUST_LOG` wins when set. Otherwise `APP_LOG_LEVEL` names one plain
//! level for the service, and sqlx's per-statement logging is held at
//! `warn` so every health probe does not print its `SELECT 1`.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

const QUIET_DRIVER: &str = "sqlx::query=warn";

/// Install the global subscriber, writing to stderr. Call once from `main`.
pub fn init(level: &str) -> Result<(), AppError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

/// Filter used when `RUST_LOG` is absent.
pub fn level_filter(level: &str) -> Result<EnvFilter, AppError> {
    let level = parse_level(level)?;
    EnvFilter::try_new(format!("{level},{QUIET_DRIVER}"))
        .map_err(|e| AppError::Logger(format!("invalid log filter: {e}")))
}

/// Parse `APP_LOG_LEVEL`. Only bare levels are accepted; directives belong
/// in `RUST_LOG`.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    let level = level.trim();
    if level.is_empty() {
        return Err(AppError::Logger("APP_LOG_LEVEL must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised APP_LOG_LEVEL: '{level}'")))
}
