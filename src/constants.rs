//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Repository walker constants
pub mod walker {
    /// Upper bound on concurrent file reads, regardless of configuration
    pub const MAX_READ_CONCURRENCY: usize = 5;

    /// Default per-file skip ceiling (kilobytes)
    pub const DEFAULT_MAX_FILE_SIZE_KB: u64 = 500;

    /// Default content ceiling above which only head and tail are kept (kilobytes)
    pub const DEFAULT_MAX_CONTENT_KB: u64 = 256;

    /// Directories excluded unless configured otherwise
    pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["node_modules", "dist", "build", ".git"];

    /// Binary, minified and lock-file suffixes that are never read
    pub const EXCLUDED_SUFFIXES: &[&str] = &[
        ".min.js",
        ".bundle.js",
        ".map",
        ".svg",
        ".woff",
        ".woff2",
        ".ttf",
        ".eot",
        ".jpg",
        ".jpeg",
        ".png",
        ".gif",
        ".ico",
        ".lock",
    ];
}

/// Documentation pipeline constants
pub mod docs {
    /// Characters of each file embedded in a directory prompt
    pub const DEFAULT_MAX_PROMPT_FILE_CHARS: usize = 2000;

    /// Suffix appended to file content cut for a prompt
    pub const PROMPT_TRUNCATION_SUFFIX: &str = "... [content truncated]";

    /// Sentinel directory key for files at the repository root
    pub const ROOT_KEY: &str = "root";

    /// File stems the pipeline writes itself
    pub const INDEX_STEM: &str = "index";
    pub const OVERVIEW_STEM: &str = "overview";
}

/// Provider constants
pub mod provider {
    /// Concurrent requests against a rate-limited remote API
    pub const REMOTE_BATCH_CONCURRENCY: usize = 3;

    /// Local services process prompts one at a time
    pub const LOCAL_BATCH_CONCURRENCY: usize = 1;

    /// Fixed wait before retrying a rate-limited or rejected request (seconds)
    pub const RETRY_DELAY_SECS: u64 = 5;

    /// Retries per request after the first attempt
    pub const MAX_RETRIES: usize = 3;

    pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
    pub const DEFAULT_API_MODEL: &str = "gpt-3.5-turbo";
    pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

    /// Tokens requested from the remote API per completion
    pub const DEFAULT_MAX_TOKENS: usize = 1500;

    /// Tokens requested from the local service per completion
    pub const LOCAL_NUM_PREDICT: usize = 4096;
}

/// Repository source constants
pub mod github {
    pub const DEFAULT_API_BASE: &str = "https://api.github.com";
    pub const DEFAULT_CLONE_BASE: &str = "https://github.com";
    pub const USER_AGENT: &str = concat!("repodoc/", env!("CARGO_PKG_VERSION"));
}

/// HTTP/Network constants
pub mod network {
    /// Default LLM request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}
