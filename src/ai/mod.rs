//! AI Integration Layer
//!
//! Prompt construction, completion providers and timeout helpers used by
//! the documentation pipeline.

pub mod prompt;
pub mod provider;
pub mod timeout;

pub use prompt::{PromptBuilder, PromptSection, PromptTemplates, truncate_for_prompt};
pub use provider::{
    CompletionProvider, ErrorCategory, ErrorClassifier, LlmError, LocalProvider, RemoteProvider,
    RetryPolicy, SharedProvider, load_provider,
};
pub use timeout::{TimeoutConfig, with_timeout};
