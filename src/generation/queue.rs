//! Task-queue generation backend.
//!
//! Contract with the queue's HTTP API:
//!
//! - `POST {base}/tasks` with the same JSON body as the HTTP binding
//!   → `{"task_id": ...}`
//! - `GET {base}/tasks/{task_id}` →
//!   `{"status": "pending" | "success" | "failed", "text"?: ..., "error"?: ...}`
//!
//! `await_result` polls at the configured interval until the task resolves
//! or the per-prompt timeout elapses. A task still pending at the deadline
//! becomes [`GenerationError::TimedOut`]; the driver records it and moves on
//! to the next prompt.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument, warn};

use super::{Generate, GenerationParams, Submission, TaskHandle};
use crate::config::GenerationConfig;
use crate::error::{ConfigError, GenerationError};
use crate::utils::truncate_for_log;

#[derive(Serialize)]
struct SubmitRequest<'a> {
    prompt: &'a str,
    max_length: u32,
    temperature: f64,
    top_p: f64,
}

#[derive(Deserialize)]
struct SubmitResponse {
    task_id: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

enum TaskState {
    Pending,
    Done(String),
    Failed(String),
}

pub struct QueuedGenerator {
    client: Client,
    base_url: String,
    poll_interval: Duration,
}

impl QueuedGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            // Polls are cheap; only the individual request is bounded here.
            // The overall deadline lives in await_result.
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("trendpress/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            poll_interval: config.poll_interval(),
        })
    }

    async fn poll(&self, handle: &TaskHandle) -> Result<TaskState, GenerationError> {
        let url = format!("{}/tasks/{}", self.base_url, handle.task_id);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Backend(format!(
                "status {} while polling task {}: {}",
                status.as_u16(),
                handle.task_id,
                truncate_for_log(&body, 200)
            )));
        }

        let parsed: StatusResponse = serde_json::from_str(&body).map_err(|e| {
            GenerationError::Payload(format!("{e} in body {}", truncate_for_log(&body, 200)))
        })?;

        match parsed.status.as_str() {
            "pending" => Ok(TaskState::Pending),
            "success" => parsed
                .text
                .map(TaskState::Done)
                .ok_or_else(|| {
                    GenerationError::Payload("success status without text".to_string())
                }),
            "failed" => Ok(TaskState::Failed(
                parsed.error.unwrap_or_else(|| "unspecified failure".to_string()),
            )),
            other => Err(GenerationError::Payload(format!(
                "unknown task status {other:?}"
            ))),
        }
    }
}

impl Generate for QueuedGenerator {
    #[instrument(level = "info", skip_all)]
    async fn submit(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Submission, GenerationError> {
        let request = SubmitRequest {
            prompt,
            max_length: params.max_length,
            temperature: params.temperature,
            top_p: params.top_p,
        };

        let url = format!("{}/tasks", self.base_url);
        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Backend(format!(
                "status {}: {}",
                status.as_u16(),
                truncate_for_log(&body, 200)
            )));
        }

        let parsed: SubmitResponse = serde_json::from_str(&body).map_err(|e| {
            GenerationError::Payload(format!("{e} in body {}", truncate_for_log(&body, 200)))
        })?;
        debug!(task_id = %parsed.task_id, "queued generation task");
        Ok(Submission::Queued(TaskHandle {
            task_id: parsed.task_id,
        }))
    }

    #[instrument(level = "info", skip_all, fields(task_id = %handle.task_id))]
    async fn await_result(
        &self,
        handle: &TaskHandle,
        timeout: Duration,
    ) -> Result<String, GenerationError> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.poll(handle).await? {
                TaskState::Done(text) => return Ok(text),
                TaskState::Failed(reason) => {
                    return Err(GenerationError::Backend(format!(
                        "task {} failed: {reason}",
                        handle.task_id
                    )));
                }
                TaskState::Pending => {}
            }

            let now = Instant::now();
            if now >= deadline {
                warn!("task still pending at deadline");
                return Err(GenerationError::TimedOut {
                    task_id: handle.task_id.clone(),
                    timeout_secs: timeout.as_secs(),
                });
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}
