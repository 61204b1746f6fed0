//! Generation backends.
//!
//! Three interchangeable bindings produce article text from a prompt:
//!
//! | Binding | Module | Transport | Notes |
//! |---------|--------|-----------|-------|
//! | Local   | [`local`]  | none       | deterministic renderer for dry runs |
//! | HTTP    | [`http`]   | `POST /generate` | synchronous generation service |
//! | Queued  | [`queue`]  | `POST /tasks` + polling | asynchronous task queue |
//!
//! All of them implement [`Generate`]: `submit` either returns text
//! immediately or hands back a [`TaskHandle`], and `await_result` resolves a
//! handle within a bounded timeout. [`GenerationClient`] is the
//! config-selected enum the driver actually holds; [`RetryGenerate`] adds
//! backoff on top of any implementation.

use std::time::Duration;

use crate::config::{BackendKind, GenerationConfig};
use crate::error::{ConfigError, GenerationError};

pub mod http;
pub mod local;
pub mod queue;
pub mod retry;

pub use retry::{RetryGenerate, generate_with_backoff};

/// Sampling parameters forwarded to the backend.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub max_length: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl From<&GenerationConfig> for GenerationParams {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            max_length: config.max_length,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

/// Reference to a generation request that is still in flight.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    pub task_id: String,
}

/// What `submit` came back with.
#[derive(Debug)]
pub enum Submission {
    /// The backend answered synchronously.
    Text(String),
    /// The backend queued the request; poll with `await_result`.
    Queued(TaskHandle),
}

/// Capability set every generation backend exposes.
pub trait Generate {
    /// Send a prompt to the backend.
    async fn submit(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Submission, GenerationError>;

    /// Resolve a queued submission, waiting at most `timeout`.
    async fn await_result(
        &self,
        handle: &TaskHandle,
        timeout: Duration,
    ) -> Result<String, GenerationError>;
}

/// The config-selected backend the driver holds for a run.
pub enum GenerationClient {
    Local(local::LocalGenerator),
    Http(http::HttpGenerator),
    Queued(queue::QueuedGenerator),
}

impl GenerationClient {
    pub fn from_config(config: &GenerationConfig) -> Result<Self, ConfigError> {
        Ok(match config.backend {
            BackendKind::Local => Self::Local(local::LocalGenerator::new()),
            BackendKind::Http => Self::Http(http::HttpGenerator::new(config)?),
            BackendKind::Queued => Self::Queued(queue::QueuedGenerator::new(config)?),
        })
    }
}

impl Generate for GenerationClient {
    async fn submit(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Submission, GenerationError> {
        match self {
            Self::Local(backend) => backend.submit(prompt, params).await,
            Self::Http(backend) => backend.submit(prompt, params).await,
            Self::Queued(backend) => backend.submit(prompt, params).await,
        }
    }

    async fn await_result(
        &self,
        handle: &TaskHandle,
        timeout: Duration,
    ) -> Result<String, GenerationError> {
        match self {
            Self::Local(backend) => backend.await_result(handle, timeout).await,
            Self::Http(backend) => backend.await_result(handle, timeout).await,
            Self::Queued(backend) => backend.await_result(handle, timeout).await,
        }
    }
}
