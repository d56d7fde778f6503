pub mod error;
pub mod file;
pub mod repository;

pub use error::{DocError, ErrorCategory, ErrorClassifier, LlmError, Result, ResultExt};
pub use file::{ProcessedFile, Section, TRUNCATION_MARKER};
pub use repository::{RepoDetails, RepoMetadata};
