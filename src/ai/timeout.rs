//! Unified Timeout Configuration
//!
//! Operation-specific timeout defaults plus helpers for wrapping async
//! operations. The batch scheduler never imposes a timeout of its own, so
//! every worker that may hang (file reads, LLM calls) is wrapped here.
//!
//! ## Usage
//!
//! ```ignore
//! use repodoc::ai::timeout::{TimeoutConfig, with_timeout};
//!
//! let config = TimeoutConfig::default();
//! let text = with_timeout(
//!     config.llm_request,
//!     provider.generate_completion(&prompt),
//!     "LLM request",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::constants::network as net_constants;
use crate::types::{DocError, Result};

/// Timeout configuration for all operations
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for LLM API requests (default: 5 minutes)
    pub llm_request: Duration,
    /// Timeout for a single file stat + read (default: 30 seconds)
    pub file_io: Duration,
    /// Timeout for network connections (default: 30 seconds)
    pub connection: Duration,
    /// Timeout for cloning the repository (default: 10 minutes)
    pub clone: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_request: Duration::from_secs(net_constants::DEFAULT_TIMEOUT_SECS),
            file_io: Duration::from_secs(30),
            connection: Duration::from_secs(net_constants::CONNECTION_TIMEOUT_SECS),
            clone: Duration::from_secs(600),
        }
    }
}

impl TimeoutConfig {
    /// Defaults with the LLM request timeout taken from configuration
    pub fn with_llm_secs(secs: u64) -> Self {
        Self {
            llm_request: Duration::from_secs(secs),
            ..Self::default()
        }
    }
}

/// Execute an async operation with a timeout
///
/// Returns [`DocError::Timeout`] if the operation doesn't complete within
/// the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DocError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_config_defaults() {
        let config = TimeoutConfig::default();
        assert_eq!(config.llm_request.as_secs(), 300);
        assert_eq!(config.connection.as_secs(), 30);
        assert_eq!(config.file_io.as_secs(), 30);
    }

    #[test]
    fn test_with_llm_secs() {
        let config = TimeoutConfig::with_llm_secs(42);
        assert_eq!(config.llm_request.as_secs(), 42);
        assert_eq!(config.clone.as_secs(), 600);
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, DocError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, DocError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), DocError::Timeout { .. }));
    }
}
