//! Synchronous HTTP generation backend.
//!
//! Contract with the generation service:
//!
//! - `POST {base}/generate` with JSON
//!   `{"prompt": ..., "max_length": ..., "temperature": ..., "top_p": ...}`
//! - 2xx response carries `{"text": ...}`
//! - non-2xx carries `{"error": ...}` (or an arbitrary body, which is
//!   reported verbatim)

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use super::{Generate, GenerationParams, Submission, TaskHandle};
use crate::config::GenerationConfig;
use crate::error::{ConfigError, GenerationError};
use crate::utils::truncate_for_log;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    max_length: u32,
    temperature: f64,
    top_p: f64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    text: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct HttpGenerator {
    client: Client,
    base_url: String,
}

impl HttpGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("trendpress/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Generate for HttpGenerator {
    #[instrument(level = "info", skip_all)]
    async fn submit(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Submission, GenerationError> {
        let request = GenerateRequest {
            prompt,
            max_length: params.max_length,
            temperature: params.temperature,
            top_p: params.top_p,
        };

        let url = format!("{}/generate", self.base_url);
        debug!(%url, prompt_bytes = prompt.len(), "submitting generation request");
        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| truncate_for_log(&body, 200));
            return Err(GenerationError::Backend(format!(
                "status {}: {message}",
                status.as_u16()
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            GenerationError::Payload(format!("{e} in body {}", truncate_for_log(&body, 200)))
        })?;
        Ok(Submission::Text(parsed.text))
    }

    async fn await_result(
        &self,
        handle: &TaskHandle,
        _timeout: Duration,
    ) -> Result<String, GenerationError> {
        Err(GenerationError::Payload(format!(
            "http backend never issues task handles (got {})",
            handle.task_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_matches_contract() {
        let request = GenerateRequest {
            prompt: "write about ai",
            max_length: 512,
            temperature: 0.7,
            top_p: 0.9,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["prompt"], "write about ai");
        assert_eq!(json["max_length"], 512);
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["top_p"], 0.9);
    }

    #[test]
    fn test_response_parsing() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"text": "an article"}"#).unwrap();
        assert_eq!(parsed.text, "an article");

        let error: ErrorBody = serde_json::from_str(r#"{"error": "model busy"}"#).unwrap();
        assert_eq!(error.error.as_deref(), Some("model busy"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let mut config = GenerationConfig::default();
        config.base_url = "http://localhost:5000/".to_string();
        let backend = HttpGenerator::new(&config).unwrap();
        assert_eq!(backend.base_url, "http://localhost:5000");
    }
}
