//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/repodoc/config.toml)
//! 3. Project config (./repodoc.toml)
//! 4. Flat environment variables (GITHUB_TOKEN, LLM_TYPE, ...) and `.env`
//! 5. Prefixed environment variables (REPODOC_*)
//! 6. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
