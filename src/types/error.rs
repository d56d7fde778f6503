//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Taxonomy
//!
//! - **Config**: missing credentials or invalid settings (fatal, before any work)
//! - **Fetch**: repository metadata or clone failed (fatal for the run)
//! - **Item**: a single file read or prompt completion failed (recovered
//!   inside the scheduler, never escapes it)
//! - **Render**: document formatting failed (fatal, the index would break)
//!
//! LLM failures carry an [`ErrorCategory`] so the remote provider can decide
//! whether a request is worth retrying.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for provider retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - wait then retry
    RateLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Provider unavailable
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Categories the remote provider waits on and retries.
    ///
    /// Authentication errors are included: hosted gateways answer 401 while a
    /// rotated key propagates, and the retry count is bounded anyway.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Auth)
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// LLM error with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for retry decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
    /// HTTP status, when the error came from a response
    pub status: Option<u16>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            status: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
            status: None,
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps transport failures and HTTP statuses onto [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify HTTP status code
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            500 | 502 | 503 | 504 => ErrorCategory::Transient,
            404 => ErrorCategory::Unavailable,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider).status(status)
    }

    /// Classify a reqwest transport error
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        let category = if err.is_connect() || err.is_timeout() {
            ErrorCategory::Network
        } else if err.is_decode() || err.is_body() {
            ErrorCategory::Transient
        } else {
            ErrorCategory::Unknown
        };
        LlmError::with_provider(category, err.to_string(), provider)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DocError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    // -------------------------------------------------------------------------
    // Run Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Fetch failed ({operation}): {message}")]
    Fetch { operation: String, message: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Batch Errors
    // -------------------------------------------------------------------------
    /// Scheduler misuse (e.g. zero concurrency)
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// A single work item failed; reported, never propagated by the scheduler
    #[error("Item #{index} ({item}) failed: {message}")]
    Item {
        index: usize,
        item: String,
        message: String,
    },
}

impl From<LlmError> for DocError {
    fn from(err: LlmError) -> Self {
        DocError::Llm(err)
    }
}

impl From<std::fmt::Error> for DocError {
    fn from(err: std::fmt::Error) -> Self {
        DocError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DocError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl DocError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn fetch(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Whether this error ends the run. Item errors and timeouts are
    /// recovered by the scheduler; everything else propagates to `main`.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Item { .. } | Self::Timeout { .. } | Self::Llm(_))
    }

    /// Whether the remote provider should wait and try this request again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Llm(e) if e.is_retryable())
    }
}

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Wrap the error as a fetch failure for `operation`
    fn fetch_context(self, operation: &str) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn fetch_context(self, operation: &str) -> Result<T> {
        self.map_err(|e| DocError::fetch(operation, e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
        assert_eq!(ErrorCategory::Transient.to_string(), "TRANSIENT");
    }

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::RateLimit.is_retryable());
        assert!(ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::BadRequest.is_retryable());
        assert!(!ErrorCategory::Unknown.is_retryable());
    }

    #[test]
    fn test_classify_http_status() {
        let rate_limit = ErrorClassifier::classify_http_status(429, "Rate limited", "api");
        assert_eq!(rate_limit.category, ErrorCategory::RateLimit);
        assert_eq!(rate_limit.status, Some(429));

        let auth = ErrorClassifier::classify_http_status(401, "Unauthorized", "api");
        assert_eq!(auth.category, ErrorCategory::Auth);

        let server_error = ErrorClassifier::classify_http_status(500, "Server error", "api");
        assert_eq!(server_error.category, ErrorCategory::Transient);

        let missing = ErrorClassifier::classify_http_status(404, "No such model", "api");
        assert_eq!(missing.category, ErrorCategory::Unavailable);
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::RateLimit, "Too many requests", "api");
        assert_eq!(err.to_string(), "[api:RATE_LIMIT] Too many requests");

        let err_no_provider = LlmError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(err_no_provider.to_string(), "[NETWORK] Connection failed");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(DocError::Config("missing token".into()).is_fatal());
        assert!(DocError::Render("bad".into()).is_fatal());
        assert!(DocError::fetch("clone", "exit 128").is_fatal());
        assert!(
            !DocError::Item {
                index: 0,
                item: "a.rs".into(),
                message: "gone".into()
            }
            .is_fatal()
        );
        assert!(!DocError::timeout("read", Duration::from_secs(1)).is_fatal());
    }

    #[test]
    fn test_only_rate_limit_and_auth_retryable() {
        let rate_limited: DocError = LlmError::new(ErrorCategory::RateLimit, "slow down").into();
        let rejected: DocError = ErrorClassifier::classify_http_status(401, "bad key", "api").into();
        let server: DocError = ErrorClassifier::classify_http_status(503, "down", "api").into();

        assert!(rate_limited.is_retryable());
        assert!(rejected.is_retryable());
        assert!(!server.is_retryable());
        assert!(!DocError::timeout("request", Duration::from_secs(1)).is_retryable());
    }

    #[test]
    fn test_fmt_error_is_render_error() {
        let err: DocError = std::fmt::Error.into();
        assert!(matches!(err, DocError::Render(_)));
    }
}
