//! Retry logic with exponential backoff around generation backends.
//!
//! # Architecture
//!
//! - [`RetryGenerate`]: decorator that adds retry logic to any [`Generate`]
//!   implementation
//! - [`generate_with_backoff`]: the one-call entry point the driver uses per
//!   prompt
//!
//! # Retry Strategy
//!
//! - Maximum 5 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd
//!
//! Timeouts are never retried: the per-prompt deadline was already spent
//! waiting, and the driver treats the prompt as failed and moves on.

use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use super::{Generate, GenerationParams, Submission, TaskHandle};
use crate::error::GenerationError;

/// Wrapper that adds exponential backoff retry logic to any [`Generate`]
/// implementation.
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryGenerate<'a, T> {
    /// The underlying backend to wrap.
    inner: &'a T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<'a, T> RetryGenerate<'a, T>
where
    T: Generate,
{
    pub fn new(inner: &'a T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryGenerate<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryGenerate")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> Generate for RetryGenerate<'_, T>
where
    T: Generate,
{
    #[instrument(level = "info", skip_all)]
    async fn submit(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Submission, GenerationError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.submit(prompt, params).await {
                Ok(submission) => return Ok(submission),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if !e.is_retryable() || attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                            elapsed_ms_total = total_dt.as_millis() as u128,
                            error = %e,
                            "submit() giving up"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        ?delay,
                        error = %e,
                        "submit() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn await_result(
        &self,
        handle: &TaskHandle,
        timeout: StdDuration,
    ) -> Result<String, GenerationError> {
        // The poll loop owns its own deadline; retrying around it would
        // double-spend the per-prompt budget.
        self.inner.await_result(handle, timeout).await
    }
}

/// Run one prompt through a backend with retry, resolving a queued handle
/// when the backend hands one back.
///
/// This is the primary entry point for the generation stage. `timeout`
/// bounds how long a queued submission may stay pending before the prompt
/// is treated as failed.
#[instrument(level = "info", skip_all)]
pub async fn generate_with_backoff<G: Generate>(
    backend: &G,
    prompt: &str,
    params: &GenerationParams,
    timeout: StdDuration,
) -> Result<String, GenerationError> {
    let t0 = Instant::now();
    let api = RetryGenerate::new(backend, 5, StdDuration::from_secs(1));

    let result = match api.submit(prompt, params).await {
        Ok(Submission::Text(text)) => Ok(text),
        Ok(Submission::Queued(handle)) => api.await_result(&handle, timeout).await,
        Err(e) => Err(e),
    };
    let dt = t0.elapsed();

    match &result {
        Ok(text) => info!(
            elapsed_ms_total = dt.as_millis() as u128,
            bytes = text.len(),
            "generate_with_backoff succeeded"
        ),
        Err(e) => {
            error!(elapsed_ms_total = dt.as_millis() as u128, error = %e, "generate_with_backoff failed")
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` submits, then succeeds.
    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
    }

    impl Flaky {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Generate for Flaky {
        async fn submit(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<Submission, GenerationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(GenerationError::Backend("transient".to_string()))
            } else {
                Ok(Submission::Text("ok".to_string()))
            }
        }

        async fn await_result(
            &self,
            _handle: &TaskHandle,
            _timeout: StdDuration,
        ) -> Result<String, GenerationError> {
            unreachable!("test backend never queues")
        }
    }

    /// Always times out, counting the attempts it sees.
    struct AlwaysTimedOut {
        calls: AtomicUsize,
    }

    impl Generate for AlwaysTimedOut {
        async fn submit(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<Submission, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GenerationError::TimedOut {
                task_id: "t-1".to_string(),
                timeout_secs: 1,
            })
        }

        async fn await_result(
            &self,
            _handle: &TaskHandle,
            _timeout: StdDuration,
        ) -> Result<String, GenerationError> {
            unreachable!("test backend never queues")
        }
    }

    fn params() -> GenerationParams {
        GenerationParams {
            max_length: 64,
            temperature: 0.7,
            top_p: 0.9,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let backend = Flaky::new(2);
        let text = generate_with_backoff(&backend, "p", &params(), StdDuration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, "ok");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_retries_and_fails() {
        let backend = Flaky::new(100);
        let err = generate_with_backoff(&backend, "p", &params(), StdDuration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Backend(_)));
        // 1 initial attempt + 5 retries.
        assert_eq!(backend.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_are_not_retried() {
        let backend = AlwaysTimedOut {
            calls: AtomicUsize::new(0),
        };
        let err = generate_with_backoff(&backend, "p", &params(), StdDuration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::TimedOut { .. }));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
