use ignore::WalkBuilder;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::constants::walker::{DEFAULT_EXCLUDE_PATTERNS, EXCLUDED_SUFFIXES};
use crate::types::{DocError, Result};

/// Directory and suffix exclusions applied during enumeration
#[derive(Debug, Clone)]
pub struct ExcludeRules {
    names: Vec<String>,
    globs: Vec<glob::Pattern>,
}

impl ExcludeRules {
    /// Each pattern excludes any path containing a component equal to it,
    /// or matching the glob `**/<pattern>/**`.
    pub fn new(patterns: &[String]) -> Self {
        let names: Vec<String> = patterns
            .iter()
            .map(|p| p.trim().trim_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();

        let globs = names
            .iter()
            .filter_map(|p| glob::Pattern::new(&format!("**/{}/**", p)).ok())
            .collect();

        Self { names, globs }
    }

    /// Whether the relative, `/`-separated `path` falls under an excluded directory
    pub fn excludes_dir(&self, path: &str) -> bool {
        path.split('/')
            .any(|component| self.names.iter().any(|n| n == component))
            || self.globs.iter().any(|g| g.matches(path))
    }

    /// Whether `path` carries a binary, minified or lock-file suffix
    pub fn excludes_suffix(path: &str) -> bool {
        let lower = path.to_lowercase();
        EXCLUDED_SUFFIXES.iter().any(|s| lower.ends_with(s))
    }

    pub fn excludes(&self, path: &str) -> bool {
        self.excludes_dir(path) || Self::excludes_suffix(path)
    }
}

impl Default for ExcludeRules {
    fn default() -> Self {
        let patterns: Vec<String> = DEFAULT_EXCLUDE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();
        Self::new(&patterns)
    }
}

/// A candidate file found during enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the scan root, `/`-separated
    pub relative: String,
}

pub struct FileScanner {
    root: PathBuf,
    rules: Arc<ExcludeRules>,
}

impl FileScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            rules: Arc::new(ExcludeRules::default()),
        }
    }

    pub fn with_rules(mut self, rules: ExcludeRules) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        if !self.root.is_dir() {
            return Err(DocError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("repository root not found: {}", self.root.display()),
            )));
        }

        let root = self.root.clone();
        let rules = Arc::clone(&self.rules);

        // Prune excluded directories before descending into them
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .require_git(false)
            .follow_links(false) // Security: prevent symlink traversal attacks
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !is_dir
                    || relative_path(&root, entry.path())
                        .is_none_or(|rel| rel.is_empty() || !rules.excludes_dir(&rel))
            })
            .build();

        let mut files = Vec::new();

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let Some(relative) = relative_path(&self.root, entry.path()) else {
                continue;
            };

            if self.rules.excludes(&relative) {
                debug!(path = %relative, "Excluded");
                continue;
            }

            files.push(ScannedFile {
                path: entry.path().to_path_buf(),
                relative,
            });
        }

        Ok(files)
    }
}

/// `path` relative to `root`, joined with `/` regardless of platform
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn scanned(scanner: &FileScanner) -> Vec<String> {
        let mut paths: Vec<String> = scanner
            .scan()
            .unwrap()
            .into_iter()
            .map(|f| f.relative)
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_exclude_rules() {
        let rules = ExcludeRules::default();
        assert!(rules.excludes("node_modules/react/index.js"));
        assert!(rules.excludes("web/node_modules/react/index.js"));
        assert!(rules.excludes("web/dist/app.js"));
        assert!(rules.excludes("static/app.min.js"));
        assert!(rules.excludes("Cargo.lock"));
        assert!(rules.excludes("assets/logo.PNG"));
        assert!(!rules.excludes("src/distance.rs"));
        assert!(!rules.excludes("src/builder/mod.rs"));
    }

    #[test]
    fn test_scan_applies_exclusions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "README.md");
        touch(dir.path(), "src/main.rs");
        touch(dir.path(), "src/util/io.rs");
        touch(dir.path(), "node_modules/pkg/index.js");
        touch(dir.path(), "web/build/out.js");
        touch(dir.path(), "web/app.bundle.js");
        touch(dir.path(), ".github/workflows/ci.yml");

        let paths = scanned(&FileScanner::new(dir.path()));
        assert_eq!(
            paths,
            vec![
                ".github/workflows/ci.yml",
                "README.md",
                "src/main.rs",
                "src/util/io.rs",
            ]
        );
    }

    #[test]
    fn test_custom_patterns() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/main.rs");
        touch(dir.path(), "vendor/lib.c");
        touch(dir.path(), "node_modules/pkg/index.js");

        let rules = ExcludeRules::new(&["vendor".to_string()]);
        let paths = scanned(&FileScanner::new(dir.path()).with_rules(rules));
        assert_eq!(
            paths,
            vec!["node_modules/pkg/index.js", "src/main.rs"]
        );
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = FileScanner::new(dir.path().join("missing")).scan();
        assert!(matches!(result, Err(DocError::Io(_))));
    }

    #[test]
    fn test_empty_root() {
        let dir = TempDir::new().unwrap();
        assert!(FileScanner::new(dir.path()).scan().unwrap().is_empty());
    }
}
