//! Error types.
//!
//! `AppError` is what `app::run` hands back to `main` (message + exit code).
//! The stage errors below are what each step of a dataset run can fail with;
//! the runner turns them into per-dataset outcomes instead of propagating them.

use crate::domain::Dataset;
use crate::validate::Issue;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(1, format!("Configuration error: {err}"))
    }
}

/// Missing or malformed startup configuration. Fatal to the whole run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Why a single fetch attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchCause {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("rate limited (HTTP 429)")]
    RateLimited,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("undecodable response body: {0}")]
    Decode(String),

    #[error("API reported errors: {0}")]
    Api(String),
}

impl FetchCause {
    /// Timeouts, connection failures, 5xx and 429 are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchCause::Timeout | FetchCause::Connection(_) | FetchCause::RateLimited => true,
            FetchCause::Status(code) => (500..600).contains(code),
            FetchCause::Decode(_) | FetchCause::Api(_) => false,
        }
    }
}

/// A fetch that failed for good, either after the last allowed attempt or on
/// a cause that is not worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fetching {endpoint} ({path}) failed after {attempts} attempt(s): {cause}", path = .endpoint.path())]
pub struct FetchError {
    pub endpoint: Dataset,
    pub attempts: u32,
    pub cause: FetchCause,
}

/// The payload did not have the shape the mapper expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("{dataset} payload has no `response` array")]
    MissingResponse { dataset: Dataset },

    #[error("standings payload has no table at response[0].league.standings[0]")]
    MissingStandingsTable,

    #[error("{dataset} entry {index} is not an object")]
    MalformedEntry { dataset: Dataset, index: usize },
}

/// A dataset was rejected by the validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{dataset} failed validation with {count} fatal issue(s)", count = .issues.len())]
pub struct ValidationError {
    pub dataset: Dataset,
    pub issues: Vec<Issue>,
}

/// Warehouse failures. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("postgres error: {0}")]
    Postgres(#[from] postgres::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_causes() {
        assert!(FetchCause::Timeout.is_retryable());
        assert!(FetchCause::Connection("reset".into()).is_retryable());
        assert!(FetchCause::RateLimited.is_retryable());
        assert!(FetchCause::Status(503).is_retryable());
        assert!(!FetchCause::Status(404).is_retryable());
        assert!(!FetchCause::Status(401).is_retryable());
        assert!(!FetchCause::Decode("eof".into()).is_retryable());
        assert!(!FetchCause::Api("bad token".into()).is_retryable());
    }

    #[test]
    fn fetch_error_names_endpoint_and_attempts() {
        let err = FetchError {
            endpoint: Dataset::TopScorers,
            attempts: 3,
            cause: FetchCause::Timeout,
        };
        let msg = err.to_string();
        assert!(msg.contains("/players/topscorers"), "got: {msg}");
        assert!(msg.contains("3 attempt"), "got: {msg}");
        assert!(msg.contains("timed out"), "got: {msg}");
    }

    #[test]
    fn config_error_converts_to_exit_code_one() {
        let err: AppError = ConfigError::Missing("API_FOOTBALL_KEY").into();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("API_FOOTBALL_KEY"));
    }
}
