//! repodoc - LLM-Driven Repository Documentation Generator
//!
//! Clones a GitHub repository, reads its source files and asks a language
//! model to document each directory plus the repository as a whole. The
//! result is a set of Markdown or HTML documents with an index.
//!
//! ## Pipeline
//!
//! ```text
//! GitHub metadata + shallow clone
//!          ↓
//! Repository walk (bounded parallel reads)
//!          ↓
//! Overview prompt + one prompt per directory (bounded)
//!          ↓
//! Render → overview, per-directory documents, index
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use repodoc::{ConfigLoader, DocumentationPipeline, RepositoryWalker, WalkerOptions};
//! use repodoc::ai::{TimeoutConfig, load_provider};
//! use repodoc::render::create_renderer;
//!
//! let config = ConfigLoader::load()?;
//! let timeouts = TimeoutConfig::with_llm_secs(config.llm.timeout_secs);
//! let files = RepositoryWalker::new(WalkerOptions::from_config(&config, &timeouts))
//!     .process_repository(&checkout)
//!     .await?;
//! let provider = load_provider(&config.llm).await?;
//! let index = DocumentationPipeline::new(provider, create_renderer(config.output.format), "docs")
//!     .generate_documentation(&metadata, files)
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`scheduler`]: bounded-concurrency batch execution with per-item failure isolation
//! - [`walker`]: file enumeration, size limits, language detection
//! - [`docs`]: directory grouping and the documentation pipeline
//! - [`ai`]: prompts and completion providers (remote API, Ollama)
//! - [`render`]: Markdown and HTML output
//! - [`github`]: repository metadata and cloning
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod docs;
pub mod github;
pub mod render;
pub mod scheduler;
pub mod types;
pub mod walker;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, OutputFormat, ProviderMode};

// Error Types
pub use types::error::{DocError, ErrorCategory, Result, ResultExt};

// Domain Types
pub use types::{ProcessedFile, RepoDetails, RepoMetadata, Section};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use docs::{DocumentationPipeline, GenerationSummary};
pub use scheduler::{BatchReport, BatchScheduler, ItemFailure, TaskResult, run_bounded};
pub use walker::{RepositoryWalker, WalkerOptions};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{CompletionProvider, SharedProvider, TimeoutConfig, load_provider, with_timeout};
