//! Remote Chat Completions Provider
//!
//! OpenAI-compatible `/chat/completions` client. Rate-limit and
//! authentication failures are retried after a fixed delay, a bounded
//! number of times; every other failure is returned at once.

use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{CompletionProvider, ErrorClassifier, validate_endpoint};
use crate::constants::provider::{MAX_RETRIES, REMOTE_BATCH_CONCURRENCY, RETRY_DELAY_SECS};
use crate::types::{DocError, ErrorCategory, LlmError, Result};

const PROVIDER_NAME: &str = "api";

const SYSTEM_PROMPT: &str = "You are an assistant specialized in generating detailed, accurate technical documentation for source code.";

/// Fixed-delay retry schedule for retryable provider errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub max_retries: usize,
}

impl RetryPolicy {
    /// Longest a retried call can take when every attempt runs into
    /// `request_timeout`
    pub fn worst_case(&self, request_timeout: Duration) -> Duration {
        let retries = u32::try_from(self.max_retries).unwrap_or(u32::MAX);
        request_timeout
            .saturating_mul(retries.saturating_add(1))
            .saturating_add(self.delay.saturating_mul(retries))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(RETRY_DELAY_SECS),
            max_retries: MAX_RETRIES,
        }
    }
}

/// Run `op`, retrying while it fails with a retryable LLM error
pub(crate) async fn retry_with_policy<T, F, Fut>(policy: RetryPolicy, op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    op.retry(
        ConstantBuilder::default()
            .with_delay(policy.delay)
            .with_max_times(policy.max_retries),
    )
    .when(DocError::is_retryable)
    .notify(|err: &DocError, dur: Duration| {
        warn!(
            error = %err,
            wait_ms = dur.as_millis() as u64,
            "Provider request failed, retrying"
        );
    })
    .await
}

/// Remote provider with secure API key handling
pub struct RemoteProvider {
    /// Never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    request_timeout: Duration,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl std::fmt::Debug for RemoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl RemoteProvider {
    pub fn new(
        api_key: &str,
        api_base: &str,
        model: &str,
        temperature: f32,
        max_tokens: usize,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(DocError::Config(
                "An API key is required for the remote provider (set LLM_API_KEY)".to_string(),
            ));
        }

        let api_base = validate_endpoint(api_base, false)?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key.to_string()),
            api_base,
            model: model.to_string(),
            temperature,
            max_tokens,
            request_timeout: timeout,
            retry: RetryPolicy::default(),
            client,
        })
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// One request, no retry
    async fn request_once(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER_NAME))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("API error ({}): {}", status, body),
                PROVIDER_NAME,
            )
            .into());
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER_NAME))?;

        extract_content(body)
    }
}

fn extract_content(body: ChatCompletionResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| {
            LlmError::with_provider(
                ErrorCategory::Transient,
                "No content in completion response",
                PROVIDER_NAME,
            )
            .into()
        })
}

#[async_trait]
impl CompletionProvider for RemoteProvider {
    async fn generate_completion(&self, prompt: &str) -> Result<String> {
        retry_with_policy(self.retry, || self.request_once(prompt)).await
    }

    fn batch_concurrency(&self) -> usize {
        REMOTE_BATCH_CONCURRENCY
    }

    fn completion_deadline(&self) -> Option<Duration> {
        Some(self.retry.worst_case(self.request_timeout))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.api_base);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("Completion API is available");
                Ok(true)
            }
            Ok(resp) => {
                warn!("Completion API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Completion API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quick_policy() -> RetryPolicy {
        RetryPolicy {
            delay: Duration::from_millis(1),
            max_retries: 3,
        }
    }

    fn failing(category: ErrorCategory) -> DocError {
        LlmError::with_provider(category, "scripted", PROVIDER_NAME).into()
    }

    #[tokio::test]
    async fn test_rate_limit_retried_until_exhausted() {
        let attempts = AtomicUsize::new(0);
        let result: Result<String> = retry_with_policy(quick_policy(), || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(failing(ErrorCategory::RateLimit))
        })
        .await;

        assert!(matches!(
            result,
            Err(DocError::Llm(LlmError { category: ErrorCategory::RateLimit, .. }))
        ));
        // First attempt plus three retries
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_auth_retry_recovers() {
        let attempts = AtomicUsize::new(0);
        let result = retry_with_policy(quick_policy(), || async {
            if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(failing(ErrorCategory::Auth))
            } else {
                Ok("done".to_string())
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_not_retried() {
        for category in [
            ErrorCategory::BadRequest,
            ErrorCategory::Transient,
            ErrorCategory::Network,
        ] {
            let attempts = AtomicUsize::new(0);
            let result: Result<String> = retry_with_policy(quick_policy(), || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(failing(category))
            })
            .await;

            assert!(result.is_err());
            assert_eq!(attempts.load(Ordering::SeqCst), 1, "{category} retried");
        }
    }

    #[test]
    fn test_request_shape() {
        let provider = RemoteProvider::new(
            "sk-test",
            "https://api.openai.com/v1/",
            "gpt-3.5-turbo",
            0.3,
            1500,
            Duration::from_secs(5),
        )
        .unwrap();

        let json = serde_json::to_value(provider.build_request("document this")).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 1500);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(json["messages"][1]["content"], "document this");
        assert_eq!(provider.api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_deadline_covers_all_attempts() {
        // 4 attempts of 300s plus 3 waits of 5s
        assert_eq!(
            RetryPolicy::default().worst_case(Duration::from_secs(300)),
            Duration::from_secs(1215)
        );

        let provider = RemoteProvider::new(
            "sk-test",
            "https://api.openai.com/v1",
            "m",
            0.3,
            100,
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(provider.completion_deadline(), Some(Duration::from_secs(55)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = RemoteProvider::new(
            "sk-secret",
            "https://api.openai.com/v1",
            "m",
            0.3,
            100,
            Duration::from_secs(5),
        )
        .unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = RemoteProvider::new(
            "  ",
            "https://api.openai.com/v1",
            "m",
            0.3,
            100,
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(DocError::Config(_))));
    }

    #[test]
    fn test_extract_content() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  # Docs\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(body).unwrap(), "# Docs");

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(extract_content(empty).is_err());
    }
}
