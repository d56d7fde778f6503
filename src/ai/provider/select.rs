//! Provider selection from `llm.mode`

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::{LocalProvider, RemoteProvider, SharedProvider};
use crate::config::{LlmConfig, ProviderMode};
use crate::types::{DocError, Result};

/// Build the completion provider the configuration asks for.
///
/// - `local`: requires a local model; an unreachable service is logged and
///   the provider is still returned
/// - `api`: requires an API key
/// - `hybrid`: tries the local model when one is configured and falls back
///   to the remote API if the local service cannot be reached
pub async fn load_provider(config: &LlmConfig) -> Result<SharedProvider> {
    let timeout = Duration::from_secs(config.timeout_secs);
    info!(mode = %config.mode, "Loading completion provider");

    match config.mode {
        ProviderMode::Local => {
            let model = config.local_model.as_deref().ok_or_else(|| {
                DocError::Config(
                    "Local model not configured. Set OLLAMA_MODEL or LOCAL_MODEL_PATH".to_string(),
                )
            })?;
            let provider = local_provider(config, model, timeout)?;
            if let Err(e) = provider.initialize().await {
                warn!(
                    "Could not reach Ollama at {}: {}",
                    config.ollama_url, e
                );
            }
            Ok(Arc::new(provider))
        }
        ProviderMode::Api => Ok(Arc::new(remote_provider(config, timeout, "api")?)),
        ProviderMode::Hybrid => {
            if let Some(model) = config.local_model.as_deref() {
                let provider = local_provider(config, model, timeout)?;
                match provider.initialize().await {
                    Ok(()) => {
                        info!(model, "Hybrid mode using local model");
                        return Ok(Arc::new(provider));
                    }
                    Err(e) => warn!("Local model unavailable, falling back to API: {}", e),
                }
            }
            Ok(Arc::new(remote_provider(config, timeout, "hybrid")?))
        }
    }
}

fn local_provider(config: &LlmConfig, model: &str, timeout: Duration) -> Result<LocalProvider> {
    LocalProvider::new(model, &config.ollama_url, config.context_window, timeout)
}

fn remote_provider(config: &LlmConfig, timeout: Duration, mode: &str) -> Result<RemoteProvider> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            DocError::Config(format!(
                "API key not configured for {} mode. Set LLM_API_KEY",
                mode
            ))
        })?;

    RemoteProvider::new(
        api_key,
        &config.api_url,
        &config.model,
        config.temperature,
        config.max_tokens,
        timeout,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: ProviderMode) -> LlmConfig {
        LlmConfig {
            mode,
            timeout_secs: 2,
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn test_api_requires_key() {
        let result = load_provider(&config(ProviderMode::Api)).await;
        assert!(matches!(result, Err(DocError::Config(_))));
    }

    #[tokio::test]
    async fn test_api_with_key() {
        let mut cfg = config(ProviderMode::Api);
        cfg.api_key = Some("sk-test".to_string());

        let provider = load_provider(&cfg).await.unwrap();
        assert_eq!(provider.name(), "api");
        assert_eq!(provider.batch_concurrency(), 3);
    }

    #[tokio::test]
    async fn test_local_requires_model() {
        let result = load_provider(&config(ProviderMode::Local)).await;
        assert!(matches!(result, Err(DocError::Config(_))));
    }

    #[tokio::test]
    async fn test_local_unreachable_still_selected() {
        let mut cfg = config(ProviderMode::Local);
        cfg.local_model = Some("llama3".to_string());
        cfg.ollama_url = "http://127.0.0.1:9".to_string();

        let provider = load_provider(&cfg).await.unwrap();
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.model(), "llama3");
    }

    #[tokio::test]
    async fn test_hybrid_without_anything_is_config_error() {
        let result = load_provider(&config(ProviderMode::Hybrid)).await;
        assert!(matches!(result, Err(DocError::Config(_))));
    }

    #[tokio::test]
    async fn test_hybrid_falls_back_to_remote() {
        let mut cfg = config(ProviderMode::Hybrid);
        cfg.local_model = Some("llama3".to_string());
        cfg.ollama_url = "http://127.0.0.1:9".to_string();
        cfg.api_key = Some("sk-test".to_string());

        let provider = load_provider(&cfg).await.unwrap();
        assert_eq!(provider.name(), "api");
    }

    #[tokio::test]
    async fn test_hybrid_without_local_model_uses_remote() {
        let mut cfg = config(ProviderMode::Hybrid);
        cfg.api_key = Some("sk-test".to_string());

        let provider = load_provider(&cfg).await.unwrap();
        assert_eq!(provider.name(), "api");
    }
}
