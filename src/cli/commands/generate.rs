//! Generate Command
//!
//! Fetch a repository, read its files and write the documentation set.
//!
//! Usage:
//!   repodoc generate <owner> <repo> [branch] [--output DIR] [--format html]
//!   repodoc generate --local ./path/to/checkout

use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ai::provider::{SharedProvider, load_provider};
use crate::ai::timeout::TimeoutConfig;
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader, OutputFormat, ProviderMode};
use crate::docs::{DocumentationPipeline, GenerationSummary};
use crate::github::{self, GitHubSource, RepositorySource};
use crate::render::create_renderer;
use crate::types::{DocError, RepoDetails, RepoMetadata, Result};
use crate::walker::{RepositoryWalker, WalkerOptions};

/// Generate run options (consolidated CLI parameters)
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    /// Output directory override
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub provider: Option<ProviderMode>,
    /// Model override; the local model in `local` mode, the remote one otherwise
    pub model: Option<String>,
    /// Document an existing directory instead of cloning
    pub local: Option<PathBuf>,
    /// Keep the temporary clone
    pub keep_temp: bool,
    /// Explicit config file instead of the global and project files
    pub config_file: Option<PathBuf>,
}

/// Where the source tree comes from
#[derive(Debug)]
enum Target {
    Remote(RepoDetails),
    Local(PathBuf),
}

impl GenerateOptions {
    fn target(&self) -> Result<Target> {
        if let Some(path) = &self.local {
            return Ok(Target::Local(path.clone()));
        }

        match (&self.owner, &self.repo) {
            (Some(owner), Some(repo)) => {
                let details = RepoDetails::new(owner, repo);
                Ok(Target::Remote(match &self.branch {
                    Some(branch) => details.with_branch(branch),
                    None => details,
                }))
            }
            _ => Err(DocError::Config(
                "Repository owner or name not provided. Usage: repodoc generate <owner> <repo> [branch]"
                    .to_string(),
            )),
        }
    }
}

/// Apply command-line overrides on top of the loaded configuration
pub fn apply_overrides(config: &mut Config, options: &GenerateOptions) -> Result<()> {
    if let Some(output) = &options.output {
        config.output.dir = output.clone();
    }
    if let Some(format) = options.format {
        config.output.format = format;
    }
    if let Some(mode) = options.provider {
        config.llm.mode = mode;
    }
    if let Some(model) = &options.model {
        match config.llm.mode {
            ProviderMode::Local => config.llm.local_model = Some(model.clone()),
            ProviderMode::Api | ProviderMode::Hybrid => config.llm.model = model.clone(),
        }
    }
    if options.keep_temp {
        config.output.clean_temp = false;
    }
    config.validate()
}

/// Run documentation generation with options
pub fn run(options: GenerateOptions) -> Result<()> {
    let mut config = ConfigLoader::load_with(options.config_file.as_deref())?;
    apply_overrides(&mut config, &options)?;
    let target = options.target()?;

    let rt = Runtime::new()?;
    rt.block_on(run_async(config, target))
}

async fn run_async(config: Config, target: Target) -> Result<()> {
    let output = Output::new();
    let started = Instant::now();
    let timeouts = TimeoutConfig::with_llm_secs(config.llm.timeout_secs);

    // Credentials are checked before any network or disk work
    if matches!(target, Target::Remote(_)) && config.github.token.is_none() {
        return Err(DocError::Config(
            "GitHub token not configured. Set GITHUB_TOKEN in the environment or .env".to_string(),
        ));
    }

    let provider = load_provider(&config.llm).await?;
    match provider.health_check().await {
        Ok(true) => info!(
            provider = provider.name(),
            model = provider.model(),
            "Completion provider ready"
        ),
        Ok(false) => warn!(
            provider = provider.name(),
            model = provider.model(),
            "Completion provider failed its health check, requests may fail"
        ),
        Err(e) => warn!(provider = provider.name(), "Health check error: {}", e),
    }

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let summary = match target {
        Target::Local(path) => {
            output.header(&format!("Documenting {}", path.display()));
            let metadata = RepoMetadata::local(directory_name(&path));
            document_tree(&config, &timeouts, provider, &metadata, &path, cancel).await?
        }
        Target::Remote(details) => {
            output.header(&format!("Documenting {}", details));
            let source = GitHubSource::new(
                &config.github,
                &config.output.temp_dir,
                timeouts.connection,
                timeouts.clone,
            )?;

            info!("Fetching repository metadata");
            let metadata = source.get_metadata(&details.owner, &details.repo).await?;
            let branch = details
                .branch
                .clone()
                .unwrap_or_else(|| metadata.default_branch.clone());

            let root = source
                .fetch_tree(&details.owner, &details.repo, &branch)
                .await?;
            output.info(&format!("Cloned {} into {}", branch, root.display()));

            let result =
                document_tree(&config, &timeouts, provider, &metadata, &root, cancel).await;

            if config.output.clean_temp {
                github::cleanup(&root).await;
            } else {
                output.info(&format!("Kept clone at {}", root.display()));
            }
            result?
        }
    };

    print_summary(&output, &summary, started);
    Ok(())
}

async fn document_tree(
    config: &Config,
    timeouts: &TimeoutConfig,
    provider: SharedProvider,
    metadata: &RepoMetadata,
    root: &Path,
    cancel: CancellationToken,
) -> Result<GenerationSummary> {
    let walker = RepositoryWalker::new(WalkerOptions::from_config(config, timeouts))
        .with_cancellation(cancel.clone());
    let files = walker.process_repository(root).await?;
    info!("Repository processed: {} files", files.len());

    DocumentationPipeline::new(
        provider,
        create_renderer(config.output.format),
        &config.output.dir,
    )
    .with_concurrency(config.processing.max_concurrent_processes)
    .with_prompt_file_chars(config.processing.max_prompt_file_chars)
    .with_llm_timeout(timeouts.llm_request)
    .with_cancellation(cancel)
    .generate(metadata, files)
    .await
}

/// Cancel pending work on Ctrl-C; in-flight requests still finish
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight work");
            cancel.cancel();
        }
    });
}

fn directory_name(path: &Path) -> String {
    path.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repository".to_string())
}

fn print_summary(output: &Output, summary: &GenerationSummary, started: Instant) {
    output.section("Documentation");
    output.detail("Index", summary.index_path.display());
    output.detail("Overview", summary.overview_path.display());
    output.detail("Directories", summary.documents_written);
    output.detail(
        "Duration",
        format!("{:.1}s", started.elapsed().as_secs_f64()),
    );

    if !summary.directories_failed.is_empty() {
        output.warning(&format!(
            "{} directories failed: {}",
            summary.directories_failed.len(),
            summary.directories_failed.join(", ")
        ));
    }
    if summary.directories_skipped > 0 {
        output.warning(&format!(
            "{} directories skipped after interrupt",
            summary.directories_skipped
        ));
    }
    if summary.is_complete() {
        output.success("Documentation generated");
    } else {
        output.success("Documentation generated with omissions");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_requires_owner_and_repo() {
        let options = GenerateOptions {
            owner: Some("rust-lang".into()),
            ..Default::default()
        };
        assert!(matches!(options.target(), Err(DocError::Config(_))));
    }

    #[test]
    fn test_target_remote_and_local() {
        let remote = GenerateOptions {
            owner: Some("rust-lang".into()),
            repo: Some("cargo".into()),
            branch: Some("master".into()),
            ..Default::default()
        };
        match remote.target().unwrap() {
            Target::Remote(details) => assert_eq!(details.to_string(), "rust-lang/cargo@master"),
            other => panic!("unexpected target {:?}", other),
        }

        let local = GenerateOptions {
            local: Some(PathBuf::from("./checkout")),
            ..Default::default()
        };
        assert!(matches!(local.target().unwrap(), Target::Local(_)));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        let options = GenerateOptions {
            output: Some(PathBuf::from("site")),
            format: Some(OutputFormat::Html),
            provider: Some(ProviderMode::Api),
            model: Some("gpt-4o-mini".into()),
            keep_temp: true,
            ..Default::default()
        };

        apply_overrides(&mut config, &options).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("site"));
        assert_eq!(config.output.format, OutputFormat::Html);
        assert_eq!(config.llm.mode, ProviderMode::Api);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!(!config.output.clean_temp);
    }

    #[test]
    fn test_model_override_in_local_mode() {
        let mut config = Config::default();
        let options = GenerateOptions {
            provider: Some(ProviderMode::Local),
            model: Some("llama3".into()),
            ..Default::default()
        };

        apply_overrides(&mut config, &options).unwrap();
        assert_eq!(config.llm.local_model.as_deref(), Some("llama3"));
    }

    #[test]
    fn test_directory_name() {
        let temp = tempfile::TempDir::new().unwrap();
        let checkout = temp.path().join("my-project");
        std::fs::create_dir(&checkout).unwrap();
        assert_eq!(directory_name(&checkout), "my-project");
    }
}
