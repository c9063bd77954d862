//! Process configuration, read from the environment (and an optional `.env`).

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use validator::Validate;

use crate::error::AppError;

pub const ENV_DATA_FILE: &str = "QUERYLENS_DATA_FILE";
pub const ENV_QUESTION_FIELD: &str = "QUERYLENS_QUESTION_FIELD";
pub const ENV_WORKERS: &str = "QUERYLENS_WORKERS";
pub const ENV_TIMEOUT_SECS: &str = "QUERYLENS_TIMEOUT_SECS";
pub const ENV_LOG_FORMAT: &str = "QUERYLENS_LOG_FORMAT";

pub const DEFAULT_DATA_FILE: &str = "data/questions.json";
pub const DEFAULT_QUESTION_FIELD: &str = "Original Question";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// Bunyan JSON records
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "unknown log format '{}' (expected 'pretty' or 'json')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct AppConfig {
    /// JSON file holding the question records.
    pub data_file: PathBuf,

    /// Record field that holds the question text.
    #[validate(length(min = 1))]
    pub question_field: String,

    /// Number of chunks a batch is split into.
    #[validate(range(min = 1, max = 256))]
    pub workers: usize,

    #[validate(range(min = 1, max = 3600))]
    pub timeout_secs: u64,

    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            question_field: DEFAULT_QUESTION_FIELD.to_string(),
            workers: default_workers(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_format: LogFormat::default(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(256)
}

impl AppConfig {
    /// Loads `.env` if present, then reads the `QUERYLENS_*` variables.
    pub fn from_env() -> Result<Self, AppError> {
        if let Ok(path) = dotenv::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from a variable lookup. Unset or blank
    /// variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_DATA_FILE) {
            config.data_file = PathBuf::from(path.trim());
        }
        if let Some(field) = get(ENV_QUESTION_FIELD) {
            config.question_field = field;
        }
        if let Some(raw) = get(ENV_WORKERS) {
            config.workers = parse_var(ENV_WORKERS, &raw)?;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            config.timeout_secs = parse_var(ENV_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = get(ENV_LOG_FORMAT) {
            config.log_format = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{}='{}': {}", name, raw, e)))
}
