//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Credentials are never serialized and are redacted in debug output.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{docs, github, network, provider, walker};
use crate::types::{DocError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Repository source settings
    pub github: GithubConfig,

    /// Completion provider settings
    pub llm: LlmConfig,

    /// File walking and prompt settings
    pub processing: ProcessingConfig,

    /// Documentation output settings
    pub output: OutputConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DocError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DocError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(DocError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        let processing = &self.processing;
        if processing.max_concurrent_processes == 0 {
            return Err(DocError::Config(
                "max_concurrent_processes must be greater than 0".to_string(),
            ));
        }

        if processing.max_file_size_kb == 0 || processing.max_content_kb == 0 {
            return Err(DocError::Config(
                "File size limits must be greater than 0".to_string(),
            ));
        }

        if processing.max_prompt_file_chars == 0 {
            return Err(DocError::Config(
                "max_prompt_file_chars must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// GitHub Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Personal access token; never serialized to output
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// REST API base URL
    pub api_url: String,

    /// Base URL repositories are cloned from
    pub clone_url: String,
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("clone_url", &self.clone_url)
            .finish()
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: github::DEFAULT_API_BASE.to_string(),
            clone_url: github::DEFAULT_CLONE_BASE.to_string(),
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// How the completion provider is chosen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    /// Local service only
    Local,
    /// Remote API only
    Api,
    /// Local service if reachable, else remote API
    #[default]
    Hybrid,
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderMode::Local => write!(f, "local"),
            ProviderMode::Api => write!(f, "api"),
            ProviderMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for ProviderMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(ProviderMode::Local),
            "api" => Ok(ProviderMode::Api),
            "hybrid" => Ok(ProviderMode::Hybrid),
            _ => Err(format!(
                "Unknown provider mode: {}. Valid values: local, api, hybrid",
                s
            )),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider selection mode
    pub mode: ProviderMode,

    /// Remote model name
    pub model: String,

    /// Remote API key; never serialized to output
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Remote API base URL (OpenAI-compatible)
    pub api_url: String,

    /// Local model name; required for `local`, enables the local attempt in `hybrid`
    pub local_model: Option<String>,

    /// Local service base URL
    pub ollama_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature for the remote API
    pub temperature: f32,

    /// Tokens requested per remote completion
    pub max_tokens: usize,

    /// Context window passed to the local service
    pub context_window: usize,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("mode", &self.mode)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("local_model", &self.local_model)
            .field("ollama_url", &self.ollama_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("context_window", &self.context_window)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            mode: ProviderMode::Hybrid,
            model: provider::DEFAULT_API_MODEL.to_string(),
            api_key: None,
            api_url: provider::DEFAULT_API_BASE.to_string(),
            local_model: None,
            ollama_url: provider::DEFAULT_OLLAMA_URL.to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.3,
            max_tokens: provider::DEFAULT_MAX_TOKENS,
            context_window: 4096,
        }
    }
}

// =============================================================================
// Processing Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Files above this size are skipped (kilobytes)
    pub max_file_size_kb: u64,

    /// Files above this size keep only head and tail (kilobytes)
    pub max_content_kb: u64,

    /// Concurrency for file reads (capped at 5) and directory prompts
    pub max_concurrent_processes: usize,

    /// Characters of each file embedded in a directory prompt
    pub max_prompt_file_chars: usize,

    /// Directory names excluded from the walk; accepts a list or a
    /// comma-separated string
    #[serde(deserialize_with = "string_or_seq")]
    pub exclude_patterns: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_file_size_kb: walker::DEFAULT_MAX_FILE_SIZE_KB,
            max_content_kb: walker::DEFAULT_MAX_CONTENT_KB,
            max_concurrent_processes: 2,
            max_prompt_file_chars: docs::DEFAULT_MAX_PROMPT_FILE_CHARS,
            exclude_patterns: walker::DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Accept `["a", "b"]` or `"a,b"`
fn string_or_seq<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrSeq {
        One(String),
        Many(Vec<String>),
    }

    Ok(match StringOrSeq::deserialize(deserializer)? {
        StringOrSeq::One(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect(),
        StringOrSeq::Many(list) => list,
    })
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!(
                "Unknown output format: {}. Valid values: markdown, html",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Directory documents are written to
    pub dir: PathBuf,

    /// Directory repositories are cloned into
    pub temp_dir: PathBuf,

    /// Remove the clone after the run
    pub clean_temp: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Markdown,
            dir: PathBuf::from("output"),
            temp_dir: std::env::temp_dir().join("repodoc"),
            clean_temp: true,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.mode, ProviderMode::Hybrid);
        assert_eq!(config.processing.max_concurrent_processes, 2);
        assert!(config.processing.max_content_kb < config.processing.max_file_size_kb);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.processing.max_concurrent_processes = 0;
        assert!(matches!(config.validate(), Err(DocError::Config(_))));

        let mut config = Config::default();
        config.llm.temperature = 2.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.processing.max_content_kb = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_mode_parse() {
        assert_eq!("api".parse::<ProviderMode>().unwrap(), ProviderMode::Api);
        assert_eq!("LOCAL".parse::<ProviderMode>().unwrap(), ProviderMode::Local);
        assert_eq!(ProviderMode::Hybrid.to_string(), "hybrid");
        assert!("cloud".parse::<ProviderMode>().is_err());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("html".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_exclude_patterns_accept_string_or_list() {
        let from_string: ProcessingConfig =
            serde_json::from_str(r#"{"exclude_patterns": "vendor, target,,.cache"}"#).unwrap();
        assert_eq!(from_string.exclude_patterns, vec!["vendor", "target", ".cache"]);

        let from_list: ProcessingConfig =
            serde_json::from_str(r#"{"exclude_patterns": ["vendor"]}"#).unwrap();
        assert_eq!(from_list.exclude_patterns, vec!["vendor"]);
    }

    #[test]
    fn test_secrets_not_serialized_or_debugged() {
        let mut config = Config::default();
        config.github.token = Some("ghp_secret".to_string());
        config.llm.api_key = Some("sk-secret".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));

        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
