//! Repository Source
//!
//! Where the code being documented comes from. [`GitHubSource`] reads
//! repository metadata from the GitHub REST API and makes a shallow clone
//! with the `git` binary.

mod api;

pub use api::GitHubSource;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::types::{RepoMetadata, Result};

#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Descriptive metadata for the overview document
    async fn get_metadata(&self, owner: &str, repo: &str) -> Result<RepoMetadata>;

    /// Make the source tree available locally and return its root
    async fn fetch_tree(&self, owner: &str, repo: &str, branch: &str) -> Result<PathBuf>;
}

/// Remove a fetched tree. Failure only warns; the documents are already written.
pub async fn cleanup(path: &Path) {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => debug!("Removed temporary clone: {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove temporary clone {}: {}", path.display(), e),
    }
}
