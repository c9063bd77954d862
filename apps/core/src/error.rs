use std::io;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
#[derive(Debug, Error)]
pub enum AppError {
    /// No usable question was supplied to an analysis stage.
    ///
    /// Callers should report "no data available" rather than retry.
    #[error("No input data: {0} received no non-empty questions")]
    InputEmpty(String),

    /// The part-of-speech tagger could not be initialized.
    #[error("POS tagger unavailable: {0}")]
    TaggerUnavailable(String),

    /// The sentiment scorer could not be initialized.
    #[error("Sentiment scorer unavailable: {0}")]
    ScorerUnavailable(String),

    /// The tagger rejected a single input.
    #[error("Tagging failed: {0}")]
    Tagging(String),

    /// The scorer rejected a single input.
    #[error("Scoring failed: {0}")]
    Scoring(String),

    /// A caller-supplied analysis setting could not be used as given.
    #[error("Malformed configuration: {0}")]
    MalformedConfig(String),

    /// Represents configuration-related errors (e.g., unparseable environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents data validation errors (e.g., invalid input format).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents failures of the analysis actor, such as a closed channel.
    #[error("Actor error: {0}")]
    Actor(String),

    /// Represents errors from operations that did not complete in time.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for the "nothing to analyze" condition, which is reported but not retried.
    pub fn is_input_empty(&self) -> bool {
        matches!(self, AppError::InputEmpty(_))
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::InputEmpty(s) => AppError::InputEmpty(s.clone()),
            AppError::TaggerUnavailable(s) => AppError::TaggerUnavailable(s.clone()),
            AppError::ScorerUnavailable(s) => AppError::ScorerUnavailable(s.clone()),
            AppError::Tagging(s) => AppError::Tagging(s.clone()),
            AppError::Scoring(s) => AppError::Scoring(s.clone()),
            AppError::MalformedConfig(s) => AppError::MalformedConfig(s.clone()),
            AppError::Config(s) => AppError::Config(s.clone()),
            AppError::Io(e) => AppError::Io(io::Error::new(e.kind(), e.to_string())),
            AppError::Validation(s) => AppError::Validation(s.clone()),
            AppError::Actor(s) => AppError::Actor(s.clone()),
            AppError::Timeout(s) => AppError::Timeout(s.clone()),
            AppError::Internal(s) => AppError::Internal(s.clone()),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout(format!("Operation timed out: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Worker task failed: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}
