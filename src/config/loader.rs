//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/repodoc/config.toml)
//! 3. Project config (./repodoc.toml)
//! 4. Flat environment keys (GITHUB_TOKEN, LLM_TYPE, ...), `.env` included
//! 5. Prefixed environment keys (REPODOC_LLM__MODEL -> llm.model)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::types::{DocError, Result};

/// Flat environment keys and the config key each one sets
const FLAT_ENV_KEYS: &[(&str, &str)] = &[
    ("GITHUB_TOKEN", "github.token"),
    ("GITHUB_API_URL", "github.api_url"),
    ("LLM_TYPE", "llm.mode"),
    ("LLM_API_KEY", "llm.api_key"),
    ("LLM_API_URL", "llm.api_url"),
    ("LLM_MODEL", "llm.model"),
    ("LOCAL_MODEL_PATH", "llm.local_model"),
    ("OLLAMA_URL", "llm.ollama_url"),
    ("CONTEXT_WINDOW", "llm.context_window"),
    ("MAX_FILE_SIZE_KB", "processing.max_file_size_kb"),
    ("MAX_CONTENT_KB", "processing.max_content_kb"),
    ("MAX_CONCURRENT_PROCESSES", "processing.max_concurrent_processes"),
    ("EXCLUDE_PATTERNS", "processing.exclude_patterns"),
    ("OUTPUT_FORMAT", "output.format"),
    ("OUTPUT_DIR", "output.dir"),
    ("TEMP_DIR", "output.temp_dir"),
    ("CLEAN_TEMP", "output.clean_temp"),
];

/// Set after the flat keys so it wins over `LOCAL_MODEL_PATH`
const OLLAMA_MODEL_KEY: &str = "OLLAMA_MODEL";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → flat env → prefixed env
    pub fn load() -> Result<Config> {
        // A missing .env is the normal case
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from: {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Merge global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        // Merge project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        Self::extract(Self::merge_env(figment))
    }

    /// Load from an explicit file when one is given, otherwise resolve the
    /// global and project files
    pub fn load_with(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific file, still honouring the environment
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if !path.is_file() {
            return Err(DocError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path));
        Self::extract(Self::merge_env(figment))
    }

    fn merge_env(figment: Figment) -> Figment {
        let flat_keys: Vec<&str> = FLAT_ENV_KEYS.iter().map(|(var, _)| *var).collect();

        figment
            .merge(
                Env::raw()
                    .only(&flat_keys)
                    .map(|key| Self::flat_key_target(key.as_str()).into()),
            )
            .merge(
                Env::raw()
                    .only(&[OLLAMA_MODEL_KEY])
                    .map(|_| "llm.local_model".into()),
            )
            .merge(Env::prefixed("REPODOC_").split("__").lowercase(true))
    }

    /// Config key set by a flat environment variable; matching ignores case
    fn flat_key_target(var: &str) -> &'static str {
        FLAT_ENV_KEYS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(var))
            .map(|(_, target)| *target)
            .unwrap_or("unknown")
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| DocError::Config(format!("Configuration error: {}", e)))?;

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/repodoc/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("repodoc"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from("repodoc.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Render the effective configuration; credentials are omitted
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| DocError::Config(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputFormat, ProviderMode};
    use figment::Jail;

    #[test]
    fn test_flat_key_target() {
        assert_eq!(ConfigLoader::flat_key_target("LLM_TYPE"), "llm.mode");
        assert_eq!(ConfigLoader::flat_key_target("llm_type"), "llm.mode");
        assert_eq!(
            ConfigLoader::flat_key_target("LOCAL_MODEL_PATH"),
            "llm.local_model"
        );
    }

    #[test]
    fn test_file_and_flat_env_merge() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                [llm]
                model = "gpt-4o-mini"
                temperature = 0.5

                [output]
                format = "html"
                "#,
            )?;
            jail.set_env("LLM_TYPE", "api");
            jail.set_env("LLM_API_KEY", "sk-test");
            jail.set_env("MAX_CONCURRENT_PROCESSES", "4");
            jail.set_env("EXCLUDE_PATTERNS", "vendor,target");
            jail.set_env("OLLAMA_MODEL", "llama3");

            let config = ConfigLoader::load_from_file(Path::new("custom.toml"))
                .map_err(|e| e.to_string())?;

            assert_eq!(config.llm.model, "gpt-4o-mini");
            assert_eq!(config.llm.mode, ProviderMode::Api);
            assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
            assert_eq!(config.llm.local_model.as_deref(), Some("llama3"));
            assert_eq!(config.output.format, OutputFormat::Html);
            assert_eq!(config.processing.max_concurrent_processes, 4);
            assert_eq!(config.processing.exclude_patterns, vec!["vendor", "target"]);
            Ok(())
        });
    }

    #[test]
    fn test_ollama_model_wins_over_local_model_path() {
        Jail::expect_with(|jail| {
            jail.create_file("empty.toml", "")?;
            jail.set_env("LOCAL_MODEL_PATH", "from-path");
            jail.set_env("OLLAMA_MODEL", "from-ollama");

            let config = ConfigLoader::load_from_file(Path::new("empty.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.llm.local_model.as_deref(), Some("from-ollama"));
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_overrides_flat() {
        Jail::expect_with(|jail| {
            jail.create_file("empty.toml", "")?;
            jail.set_env("OUTPUT_DIR", "docs-flat");
            jail.set_env("REPODOC_OUTPUT__DIR", "docs-prefixed");

            let config = ConfigLoader::load_from_file(Path::new("empty.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.output.dir, PathBuf::from("docs-prefixed"));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.toml", "[processing]\nmax_concurrent_processes = 0\n")?;
            let result = ConfigLoader::load_from_file(Path::new("bad.toml"));
            assert!(matches!(result, Err(DocError::Config(_))));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_must_exist() {
        Jail::expect_with(|_| {
            let result = ConfigLoader::load_with(Some(Path::new("missing.toml")));
            assert!(matches!(result, Err(DocError::Config(_))));
            Ok(())
        });
    }

    #[test]
    fn test_render_omits_secrets() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-hidden".to_string());

        let toml = ConfigLoader::render(&config, false).unwrap();
        assert!(toml.contains("[llm]"));
        assert!(!toml.contains("sk-hidden"));

        let json = ConfigLoader::render(&config, true).unwrap();
        assert!(json.contains("\"processing\""));
        assert!(!json.contains("sk-hidden"));
    }
}
