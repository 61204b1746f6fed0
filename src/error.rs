//! Error types for every seam of the pipeline.
//!
//! Each external collaborator gets its own error enum ([`SourceError`] for the
//! trends provider, [`GenerationError`] for the generation backends,
//! [`PersistError`] for file output), and [`PipelineError`] wraps the failures
//! that end a run. The driver decides which of these are fatal:
//!
//! - A failed trends call is fatal only for the topics and interest-series
//!   stages; related-query and news fetches degrade to empty results.
//! - Generation and persistence failures are recorded per unit and never
//!   abort the run.

use std::path::PathBuf;
use thiserror::Error;

/// A call against the trends provider failed.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never completed (connect, timeout, TLS, body read).
    #[error("trend provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("trend provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The provider answered 2xx but the payload did not match the contract.
    #[error("malformed trend provider payload: {0}")]
    Payload(String),
}

/// A generation attempt failed, regardless of backend binding.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport-level failure talking to the backend.
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend reported an error of its own (non-2xx body, failed task).
    #[error("generation backend error: {0}")]
    Backend(String),

    /// A queued task was still pending when the per-prompt timeout elapsed.
    #[error("generation task {task_id} still pending after {timeout_secs}s")]
    TimedOut { task_id: String, timeout_secs: u64 },

    /// The backend answered but the payload did not match the contract.
    #[error("malformed generation response: {0}")]
    Payload(String),
}

impl GenerationError {
    /// Whether a retry with backoff has any chance of succeeding.
    ///
    /// A timeout already consumed the full per-prompt budget, so retrying it
    /// would double-spend the run's time; everything else is worth another
    /// attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GenerationError::TimedOut { .. })
    }
}

/// Failure while writing or reading a persisted file.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration could not be loaded or failed validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid timeframe {0:?} (expected e.g. \"now 7-d\", \"today 3-m\", or \"all\")")]
    InvalidTimeframe(String),

    #[error("invalid base url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

/// A failure that terminates the whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The trends provider was unavailable at a stage that requires it.
    #[error("{stage} failed: {source}")]
    Source {
        stage: &'static str,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_not_retryable() {
        let err = GenerationError::TimedOut {
            task_id: "t-1".to_string(),
            timeout_secs: 120,
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_backend_error_is_retryable() {
        assert!(GenerationError::Backend("boom".to_string()).is_retryable());
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Status {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "trend provider returned status 503: maintenance"
        );
    }

    #[test]
    fn test_pipeline_error_names_stage() {
        let err = PipelineError::Source {
            stage: "fetch_topics",
            source: SourceError::Payload("not json".to_string()),
        };
        assert!(err.to_string().starts_with("fetch_topics failed"));
    }
}
