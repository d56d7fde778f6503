//! Documentation Pipeline
//!
//! Turns processed files into a documentation set:
//!
//! ```text
//! overview prompt → overview.<ext>
//! group by directory → one prompt per directory (bounded) → <dir>.<ext>
//!                                                          ↓
//!                                                     index.<ext>
//! ```
//!
//! The overview and every write are fatal on failure. A directory whose
//! completion fails is left out of the index and the run continues.

mod grouping;

pub use grouping::{DirectoryKey, assign_file_names, group_by_directory, sanitize};

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::ai::prompt::PromptTemplates;
use crate::ai::provider::SharedProvider;
use crate::ai::timeout::with_timeout;
use crate::constants::docs::{DEFAULT_MAX_PROMPT_FILE_CHARS, INDEX_STEM, OVERVIEW_STEM};
use crate::constants::network::DEFAULT_TIMEOUT_SECS;
use crate::render::SharedRenderer;
use crate::scheduler::BatchScheduler;
use crate::types::{ProcessedFile, RepoMetadata, Result, Section};

/// What a pipeline run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub index_path: PathBuf,
    pub overview_path: PathBuf,
    pub documents_written: usize,
    /// Directory keys whose documentation could not be generated
    pub directories_failed: Vec<String>,
    /// Directories not attempted because the run was cancelled
    pub directories_skipped: usize,
}

impl GenerationSummary {
    pub fn is_complete(&self) -> bool {
        self.directories_failed.is_empty() && self.directories_skipped == 0
    }
}

/// One directory prompt awaiting completion
#[derive(Clone)]
struct DirectoryJob {
    key: DirectoryKey,
    stem: String,
    prompt: String,
}

// Failure logs show the directory, not the whole prompt
impl fmt::Debug for DirectoryJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryJob")
            .field("key", &self.key.as_str())
            .field("stem", &self.stem)
            .field("prompt_chars", &self.prompt.len())
            .finish()
    }
}

pub struct DocumentationPipeline {
    provider: SharedProvider,
    renderer: SharedRenderer,
    output_dir: PathBuf,
    max_prompt_file_chars: usize,
    concurrency: usize,
    llm_timeout: Duration,
    cancel: Option<CancellationToken>,
}

impl DocumentationPipeline {
    pub fn new(
        provider: SharedProvider,
        renderer: SharedRenderer,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            renderer,
            output_dir: output_dir.into(),
            max_prompt_file_chars: DEFAULT_MAX_PROMPT_FILE_CHARS,
            concurrency: 2,
            llm_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cancel: None,
        }
    }

    /// Directory prompts in flight at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_prompt_file_chars(mut self, max_chars: usize) -> Self {
        self.max_prompt_file_chars = max_chars;
        self
    }

    /// Deadline for each completion, the overview included. Providers that
    /// retry internally extend it to cover their worst case.
    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Generate the documentation set and return the index path
    pub async fn generate_documentation(
        &self,
        metadata: &RepoMetadata,
        files: Vec<ProcessedFile>,
    ) -> Result<PathBuf> {
        Ok(self.generate(metadata, files).await?.index_path)
    }

    /// Generate the documentation set and report what was written
    #[instrument(skip_all, fields(repo = %metadata.name, files = files.len()))]
    pub async fn generate(
        &self,
        metadata: &RepoMetadata,
        files: Vec<ProcessedFile>,
    ) -> Result<GenerationSummary> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let overview_path = self.write_overview(metadata).await?;

        let groups = group_by_directory(files);
        let names = assign_file_names(groups.keys());
        info!("Documenting {} directories", groups.len());

        let jobs: Vec<DirectoryJob> = groups
            .iter()
            .map(|(key, dir_files)| DirectoryJob {
                key: key.clone(),
                stem: names[key].clone(),
                prompt: PromptTemplates::directory(
                    key.as_str(),
                    dir_files,
                    self.max_prompt_file_chars,
                ),
            })
            .collect();

        let mut scheduler = BatchScheduler::new("directory-docs", self.concurrency)?
            .with_item_timeout(self.completion_deadline());
        if let Some(token) = &self.cancel {
            scheduler = scheduler.with_cancellation(token.clone());
        }

        let provider = &self.provider;
        let report = scheduler
            .run(jobs, |job: DirectoryJob| async move {
                debug!(directory = %job.key, "Requesting directory documentation");
                let text = provider.generate_completion(&job.prompt).await?;
                Ok::<_, crate::types::DocError>((job.key, job.stem, text))
            })
            .await;

        let directories_failed: Vec<String> = report
            .failures()
            .map(|failure| failure.item.key.to_string())
            .collect();
        let directories_skipped = report.skipped;

        let ext = self.renderer.file_extension();
        let mut sections = Vec::new();
        for (_, (key, stem, text)) in report.into_indexed() {
            let file_name = format!("{}.{}", stem, ext);
            let document = self
                .renderer
                .format_document(&format!("Documentation: {}", key), &text)?;
            self.write(&file_name, &document).await?;
            sections.push(Section::new(key.to_string(), file_name));
        }

        let index = self
            .renderer
            .format_index(&format!("Documentation: {}", metadata.name), &sections)?;
        let index_path = self.write(&format!("{}.{}", INDEX_STEM, ext), &index).await?;

        info!(
            written = sections.len(),
            failed = directories_failed.len(),
            skipped = directories_skipped,
            "Documentation written to {}",
            self.output_dir.display()
        );

        Ok(GenerationSummary {
            index_path,
            overview_path,
            documents_written: sections.len(),
            directories_failed,
            directories_skipped,
        })
    }

    async fn write_overview(&self, metadata: &RepoMetadata) -> Result<PathBuf> {
        info!("Generating repository overview");
        let prompt = PromptTemplates::repository_overview(metadata);
        let text = with_timeout(
            self.completion_deadline(),
            self.provider.generate_completion(&prompt),
            "overview completion",
        )
        .await?;

        let document = self
            .renderer
            .format_document(&format!("Overview: {}", metadata.name), &text)?;
        self.write(
            &format!("{}.{}", OVERVIEW_STEM, self.renderer.file_extension()),
            &document,
        )
        .await
    }

    /// The configured LLM timeout, or the provider's own retry budget when
    /// that is longer
    fn completion_deadline(&self) -> Duration {
        self.provider
            .completion_deadline()
            .map_or(self.llm_timeout, |deadline| deadline.max(self.llm_timeout))
    }

    async fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        tokio::fs::write(&path, contents).await?;
        debug!(path = %path.display(), bytes = contents.len(), "Document written");
        Ok(path)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
