//! Completion Provider Abstraction
//!
//! Defines the [`CompletionProvider`] trait: text in, text out.
//!
//! ## Modules
//!
//! - `remote`: OpenAI-compatible chat completions with bounded retry
//! - `local`: Ollama generate endpoint, serial batching
//! - `select`: picks a provider from configuration (local, api, hybrid)

mod local;
mod remote;
mod select;

pub use local::LocalProvider;
pub use remote::{RemoteProvider, RetryPolicy};
pub use select::load_provider;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::scheduler::BatchScheduler;
use crate::types::{DocError, Result};

/// Shared provider type for concurrent access across pipeline stages.
pub type SharedProvider = Arc<dyn CompletionProvider>;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete a single prompt
    async fn generate_completion(&self, prompt: &str) -> Result<String>;

    /// Complete many prompts through the batch scheduler.
    ///
    /// Failed prompts are logged and left out; the remaining texts keep the
    /// relative order of their prompts.
    async fn batch_process(&self, prompts: Vec<String>) -> Result<Vec<String>> {
        let scheduler = BatchScheduler::new(
            format!("{}-prompts", self.name()),
            self.batch_concurrency(),
        )?;

        let report = scheduler
            .run(prompts, move |prompt: String| async move {
                self.generate_completion(&prompt).await
            })
            .await;

        if report.failure_count() > 0 {
            warn!(
                provider = self.name(),
                failed = report.failure_count(),
                "Some prompts produced no completion"
            );
        }

        Ok(report
            .into_indexed()
            .into_iter()
            .map(|(_, text)| text)
            .collect())
    }

    /// Prompts this provider handles at once in `batch_process`
    fn batch_concurrency(&self) -> usize;

    /// Longest one `generate_completion` call can take, retries included.
    /// `None` when the provider sets no deadline of its own.
    fn completion_deadline(&self) -> Option<Duration> {
        None
    }

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;
}

/// Validate a provider endpoint URL (SSRF prevention)
///
/// Only allows http/https schemes and warns for non-localhost endpoints
/// when `expect_local` is set. Returns the URL without a trailing slash.
pub(crate) fn validate_endpoint(endpoint: &str, expect_local: bool) -> Result<String> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        DocError::Config(format!("Invalid endpoint URL '{}': {}", endpoint, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DocError::Config(format!(
            "Endpoint must use http or https scheme, got: {}",
            url.scheme()
        )));
    }

    if expect_local
        && let Some(host) = url.host_str()
        && !matches!(host, "localhost" | "127.0.0.1" | "[::1]")
    {
        warn!(
            "Local model endpoint is not localhost: {}. Ensure this is intentional.",
            host
        );
    }

    let mut result = url.to_string();
    if result.ends_with('/') {
        result.pop();
    }
    Ok(result)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted providers shared by tests across the crate

    use super::remote::retry_with_policy;
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers `"DOC:" + prompt.len()`, failing prompts that contain `fail_marker`
    pub struct EchoProvider {
        pub fail_marker: Option<String>,
        pub calls: AtomicUsize,
    }

    impl EchoProvider {
        pub fn new() -> Self {
            Self {
                fail_marker: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing_on(marker: &str) -> Self {
            Self {
                fail_marker: Some(marker.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for EchoProvider {
        async fn generate_completion(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            match &self.fail_marker {
                Some(marker) if prompt.contains(marker.as_str()) => Err(LlmError::with_provider(
                    ErrorCategory::BadRequest,
                    "scripted failure",
                    "echo",
                )
                .into()),
                _ => Ok(format!("DOC:{}", prompt.len())),
            }
        }

        fn batch_concurrency(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    /// Slow provider that answers each prompt with a rate limit
    /// `rejections` times before succeeding, retried like the remote API
    pub struct RateLimitedProvider {
        pub attempt_delay: Duration,
        pub request_timeout: Duration,
        pub policy: RetryPolicy,
        pub rejections: usize,
        pub attempts: AtomicUsize,
        per_prompt: Mutex<HashMap<String, usize>>,
    }

    impl RateLimitedProvider {
        pub fn new(attempt_delay: Duration, policy: RetryPolicy, rejections: usize) -> Self {
            Self {
                attempt_delay,
                request_timeout: attempt_delay * 2,
                policy,
                rejections,
                attempts: AtomicUsize::new(0),
                per_prompt: Mutex::new(HashMap::new()),
            }
        }

        async fn attempt(&self, prompt: &str) -> Result<String> {
            tokio::time::sleep(self.attempt_delay).await;
            self.attempts.fetch_add(1, Ordering::SeqCst);

            let seen = {
                let mut per_prompt = self.per_prompt.lock().unwrap();
                let count = per_prompt.entry(prompt.to_string()).or_insert(0);
                *count += 1;
                *count
            };

            if seen <= self.rejections {
                Err(LlmError::with_provider(ErrorCategory::RateLimit, "429", "limited").into())
            } else {
                Ok(format!("DOC:{}", prompt.len()))
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for RateLimitedProvider {
        async fn generate_completion(&self, prompt: &str) -> Result<String> {
            retry_with_policy(self.policy, || self.attempt(prompt)).await
        }

        fn batch_concurrency(&self) -> usize {
            1
        }

        fn completion_deadline(&self) -> Option<Duration> {
            Some(self.policy.worst_case(self.request_timeout))
        }

        fn name(&self) -> &str {
            "limited"
        }

        fn model(&self) -> &str {
            "limited-1"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }
}
