//! Ollama Local Provider
//!
//! Completions from a locally running Ollama model. Prompts are processed
//! one at a time so a single local model is never oversubscribed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{CompletionProvider, ErrorClassifier, validate_endpoint};
use crate::constants::provider::{LOCAL_BATCH_CONCURRENCY, LOCAL_NUM_PREDICT};
use crate::types::{DocError, ErrorCategory, LlmError, Result};

const PROVIDER_NAME: &str = "ollama";

const LOCAL_TEMPERATURE: f32 = 0.1;
const LOCAL_TOP_P: f32 = 0.9;
const LOCAL_TOP_K: u32 = 40;

/// Ollama provider
#[derive(Debug)]
pub struct LocalProvider {
    api_base: String,
    model: String,
    context_window: usize,
    request_timeout: Duration,
    client: reqwest::Client,
}

impl LocalProvider {
    pub fn new(
        model: &str,
        api_base: &str,
        context_window: usize,
        timeout: Duration,
    ) -> Result<Self> {
        if model.trim().is_empty() {
            return Err(DocError::Config(
                "A local model name is required (set OLLAMA_MODEL or LOCAL_MODEL_PATH)".to_string(),
            ));
        }

        let api_base = validate_endpoint(api_base, true)?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocError::Http(format!("Failed to create HTTP client: {}", e)))?;

        info!(model, endpoint = %api_base, "Using Ollama model");

        Ok(Self {
            api_base,
            model: model.to_string(),
            context_window,
            request_timeout: timeout,
            client,
        })
    }

    /// Confirm the Ollama service answers.
    ///
    /// An unreachable service is an error. A model missing from the listing
    /// only warns, since Ollama can pull it on first use.
    pub async fn initialize(&self) -> Result<()> {
        let models = self.list_models().await?;

        if models.iter().any(|name| self.matches_model(name)) {
            info!(model = %self.model, "Model found in Ollama");
        } else {
            warn!(
                "Model '{}' not found in Ollama. Available: {}. Pull with: ollama pull {}",
                self.model,
                models.join(", "),
                self.model
            );
        }
        Ok(())
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.api_base);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_connect() {
                LlmError::with_provider(
                    ErrorCategory::Unavailable,
                    format!(
                        "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                        self.api_base
                    ),
                    PROVIDER_NAME,
                )
            } else {
                ErrorClassifier::classify_transport(&e, PROVIDER_NAME)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Ollama model listing failed ({})", status),
                PROVIDER_NAME,
            )
            .into());
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER_NAME))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// `llama3` matches a listed `llama3:latest`
    fn matches_model(&self, listed: &str) -> bool {
        listed == self.model
            || listed
                .strip_suffix(":latest")
                .is_some_and(|base| base == self.model)
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> OllamaRequest<'a> {
        OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: LOCAL_TEMPERATURE,
                num_predict: LOCAL_NUM_PREDICT,
                top_p: LOCAL_TOP_P,
                top_k: LOCAL_TOP_K,
                num_ctx: self.context_window,
            },
        }
    }
}

#[async_trait]
impl CompletionProvider for LocalProvider {
    async fn generate_completion(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.api_base);
        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending request to Ollama");

        let response = self
            .client
            .post(&url)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER_NAME))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Ollama API error ({}): {}", status, body),
                PROVIDER_NAME,
            )
            .into());
        }

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER_NAME))?;

        Ok(body.response.trim().to_string())
    }

    fn batch_concurrency(&self) -> usize {
        LOCAL_BATCH_CONCURRENCY
    }

    fn completion_deadline(&self) -> Option<Duration> {
        Some(self.request_timeout)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(models) => Ok(models.iter().any(|name| self.matches_model(name))),
            Err(e) => {
                warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: usize,
    top_p: f32,
    top_k: u32,
    num_ctx: usize,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}
