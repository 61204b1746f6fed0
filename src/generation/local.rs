//! In-process generation backend.
//!
//! Renders a deterministic draft from the prompt alone, without touching a
//! model or the network. Like a causal model's decode, the output begins
//! with the prompt text and continues from it, and the whole thing is capped
//! at `max_length` whitespace-separated tokens.

use std::time::Duration;
use tracing::debug;

use super::{Generate, GenerationParams, Submission, TaskHandle};
use crate::error::GenerationError;

const CONTINUATION: &str = "\n\nThis draft takes the brief above and works through it in order: \
what pushed the topic into the trending charts, the developments behind the surge of interest, \
and what the related coverage suggests comes next. The interest figures quoted in the brief \
frame how quickly attention has grown over the period, and the related topics mark out the \
angles worth a section of their own. Each of those angles gets a short treatment here, \
grounded in the headlines named above where they exist, so an editor can expand whichever \
sections earn a fuller piece.";

#[derive(Debug, Default)]
pub struct LocalGenerator {}

impl LocalGenerator {
    pub fn new() -> Self {
        Self {}
    }
}

impl Generate for LocalGenerator {
    async fn submit(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Submission, GenerationError> {
        let mut text = String::with_capacity(prompt.len() + CONTINUATION.len());
        text.push_str(prompt.trim());
        text.push_str(CONTINUATION);

        // Token cap approximated at word granularity.
        let words: Vec<&str> = text.split_whitespace().collect();
        let capped = if words.len() > params.max_length as usize {
            words[..params.max_length as usize].join(" ")
        } else {
            text
        };

        debug!(words = capped.split_whitespace().count(), "rendered local draft");
        Ok(Submission::Text(capped))
    }

    async fn await_result(
        &self,
        handle: &TaskHandle,
        _timeout: Duration,
    ) -> Result<String, GenerationError> {
        Err(GenerationError::Payload(format!(
            "local backend never issues task handles (got {})",
            handle.task_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max_length: u32) -> GenerationParams {
        GenerationParams {
            max_length,
            temperature: 0.7,
            top_p: 0.9,
        }
    }

    #[tokio::test]
    async fn test_draft_continues_the_prompt() {
        let backend = LocalGenerator::new();
        let submission = backend
            .submit("Write a detailed article about 'ai'.", &params(512))
            .await
            .unwrap();
        let Submission::Text(text) = submission else {
            panic!("local backend must answer synchronously");
        };
        assert!(text.starts_with("Write a detailed article about 'ai'."));
        assert!(text.len() > 60);
    }

    #[tokio::test]
    async fn test_max_length_caps_output() {
        let backend = LocalGenerator::new();
        let Submission::Text(text) = backend.submit("one two three", &params(5)).await.unwrap()
        else {
            panic!("local backend must answer synchronously");
        };
        assert_eq!(text.split_whitespace().count(), 5);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let backend = LocalGenerator::new();
        let a = backend.submit("same prompt", &params(64)).await.unwrap();
        let b = backend.submit("same prompt", &params(64)).await.unwrap();
        let (Submission::Text(a), Submission::Text(b)) = (a, b) else {
            panic!("local backend must answer synchronously");
        };
        assert_eq!(a, b);
    }
}
