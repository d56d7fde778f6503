//! Repository Walker
//!
//! Enumerates the files of a checked-out repository, drops excluded and
//! oversized ones, and reads the rest into [`ProcessedFile`] records.
//! Reads are dispatched through the [`BatchScheduler`]; a file that fails
//! to read is reported and left out, it never stops the walk.

pub mod language;
mod reader;
mod scanner;

pub use language::{Language, detect_language};
pub use reader::read_content;
pub use scanner::{ExcludeRules, FileScanner, ScannedFile};

use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::ai::timeout::TimeoutConfig;
use crate::config::Config;
use crate::constants::walker::{
    DEFAULT_EXCLUDE_PATTERNS, DEFAULT_MAX_CONTENT_KB, DEFAULT_MAX_FILE_SIZE_KB,
    MAX_READ_CONCURRENCY,
};
use crate::scheduler::BatchScheduler;
use crate::types::{DocError, ProcessedFile, Result};

/// Walker tuning, usually derived from [`Config`]
#[derive(Debug, Clone)]
pub struct WalkerOptions {
    pub exclude_patterns: Vec<String>,
    /// Files larger than this are skipped entirely
    pub max_file_size_kb: u64,
    /// Files larger than this keep only head and tail
    pub max_content_kb: u64,
    pub max_concurrent_processes: usize,
    /// Deadline for one stat + read
    pub file_timeout: Duration,
}

impl Default for WalkerOptions {
    fn default() -> Self {
        Self {
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            max_file_size_kb: DEFAULT_MAX_FILE_SIZE_KB,
            max_content_kb: DEFAULT_MAX_CONTENT_KB,
            max_concurrent_processes: MAX_READ_CONCURRENCY,
            file_timeout: TimeoutConfig::default().file_io,
        }
    }
}

impl WalkerOptions {
    pub fn from_config(config: &Config, timeouts: &TimeoutConfig) -> Self {
        let processing = &config.processing;
        Self {
            exclude_patterns: processing.exclude_patterns.clone(),
            max_file_size_kb: processing.max_file_size_kb,
            max_content_kb: processing.max_content_kb,
            max_concurrent_processes: processing.max_concurrent_processes,
            file_timeout: timeouts.file_io,
        }
    }

    /// Read concurrency: the configured limit, capped at [`MAX_READ_CONCURRENCY`]
    pub fn read_concurrency(&self) -> usize {
        MAX_READ_CONCURRENCY.min(self.max_concurrent_processes)
    }
}

pub struct RepositoryWalker {
    options: WalkerOptions,
    rules: ExcludeRules,
    cancel: Option<CancellationToken>,
}

impl RepositoryWalker {
    pub fn new(options: WalkerOptions) -> Self {
        let rules = ExcludeRules::new(&options.exclude_patterns);
        Self {
            options,
            rules,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Read every eligible file under `root`, sorted by relative path.
    ///
    /// Fails only if `root` cannot be enumerated.
    #[instrument(skip(self), fields(root = %root.display()))]
    pub async fn process_repository(&self, root: &Path) -> Result<Vec<ProcessedFile>> {
        let candidates = self.scan(root).await?;
        info!("Found {} candidate files", candidates.len());
        self.read_files(candidates).await
    }

    /// Enumerate candidates on the blocking pool; large trees take a while
    async fn scan(&self, root: &Path) -> Result<Vec<ScannedFile>> {
        let scanner = FileScanner::new(root).with_rules(self.rules.clone());
        tokio::task::spawn_blocking(move || scanner.scan())
            .await
            .map_err(|e| DocError::Io(std::io::Error::other(e)))?
    }

    /// Stat and read `candidates` with bounded concurrency, sorted by path.
    ///
    /// A candidate that cannot be read (for example, deleted after the scan)
    /// is logged and left out.
    pub async fn read_files(&self, candidates: Vec<ScannedFile>) -> Result<Vec<ProcessedFile>> {
        let mut scheduler = BatchScheduler::new("file-read", self.options.read_concurrency())?
            .with_item_timeout(self.options.file_timeout);
        if let Some(token) = &self.cancel {
            scheduler = scheduler.with_cancellation(token.clone());
        }

        let report = scheduler
            .run(candidates, |file| self.process_file(file))
            .await;

        let failed = report.failure_count();
        let mut files: Vec<ProcessedFile> = report.into_successes().into_iter().flatten().collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            read = files.len(),
            failed,
            "Repository walk complete"
        );

        Ok(files)
    }

    /// Stat and read one file. `Ok(None)` means the file was skipped.
    async fn process_file(&self, file: ScannedFile) -> Result<Option<ProcessedFile>> {
        let size = tokio::fs::metadata(&file.path).await?.len();

        let max_file_bytes = self.options.max_file_size_kb * 1024;
        if size > max_file_bytes {
            warn!(
                path = %file.relative,
                size_kb = size / 1024,
                limit_kb = self.options.max_file_size_kb,
                "Skipping file above size limit"
            );
            return Ok(None);
        }

        let max_content_bytes = self.options.max_content_kb * 1024;
        let content = read_content(&file.path, size, max_content_bytes).await?;
        if size > max_content_bytes {
            debug!(path = %file.relative, size, "Content abbreviated");
        }

        let language = detect_language(&file.relative);
        debug!(path = %file.relative, language, "File read");

        Ok(Some(ProcessedFile::new(file.relative, content, language, size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TRUNCATION_MARKER;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn walker(max_file_size_kb: u64, max_content_kb: u64) -> RepositoryWalker {
        RepositoryWalker::new(WalkerOptions {
            max_file_size_kb,
            max_content_kb,
            ..WalkerOptions::default()
        })
    }

    #[tokio::test]
    async fn test_reads_and_classifies() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/main.rs", "fn main() {}");
        write(dir.path(), "web/app.tsx", "export const App = () => null;");
        write(dir.path(), "README.md", "# hello");
        write(dir.path(), "node_modules/x/index.js", "module.exports = 1;");

        let files = walker(500, 256).process_repository(dir.path()).await.unwrap();

        let summary: Vec<(&str, &str)> = files
            .iter()
            .map(|f| (f.path.as_str(), f.language.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("README.md", "Markdown"),
                ("src/main.rs", "Rust"),
                ("web/app.tsx", "React TSX"),
            ]
        );
        assert_eq!(files[1].content, "fn main() {}");
        assert_eq!(files[1].size, 12);
    }

    #[tokio::test]
    async fn test_oversized_file_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "small.txt", "tiny");
        write(dir.path(), "huge.txt", &"x".repeat(3 * 1024));

        let files = walker(2, 1).process_repository(dir.path()).await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "small.txt");
        assert_eq!(files[0].language, "Unknown");
    }

    #[tokio::test]
    async fn test_large_file_truncated_with_original_size() {
        let dir = TempDir::new().unwrap();
        let body = format!("{}{}", "a".repeat(2048), "z".repeat(2048));
        write(dir.path(), "lib/data.sql", &body);

        let files = walker(500, 1).process_repository(dir.path()).await.unwrap();

        let file = &files[0];
        assert_eq!(file.size, 4096);
        assert!(file.is_truncated());
        assert_eq!(file.content.matches(TRUNCATION_MARKER).count(), 1);
        let (head, tail) = file.content.split_once(TRUNCATION_MARKER).unwrap();
        assert!(!head.is_empty() && head.chars().all(|c| c == 'a'));
        assert!(!tail.is_empty() && tail.chars().all(|c| c == 'z'));
    }

    #[tokio::test]
    async fn test_empty_repository() {
        let dir = TempDir::new().unwrap();
        let files = walker(500, 256).process_repository(dir.path()).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let result = walker(500, 256)
            .process_repository(&dir.path().join("nope"))
            .await;
        assert!(matches!(result, Err(DocError::Io(_))));
    }

    #[tokio::test]
    async fn test_file_deleted_after_scan_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/lib.rs", "pub mod a;");
        write(dir.path(), "src/a.rs", "pub fn a() {}");
        write(dir.path(), "src/b.rs", "pub fn b() {}");

        let walker = walker(500, 256);
        let candidates = walker.scan(dir.path()).await.unwrap();
        assert_eq!(candidates.len(), 3);
        fs::remove_file(dir.path().join("src/a.rs")).unwrap();

        let files = walker.read_files(candidates).await.unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/b.rs", "src/lib.rs"]);
    }

    #[test]
    fn test_read_concurrency_capped() {
        let options = WalkerOptions {
            max_concurrent_processes: 16,
            ..WalkerOptions::default()
        };
        assert_eq!(options.read_concurrency(), MAX_READ_CONCURRENCY);

        let options = WalkerOptions {
            max_concurrent_processes: 2,
            ..WalkerOptions::default()
        };
        assert_eq!(options.read_concurrency(), 2);
    }
}
