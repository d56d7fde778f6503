//! Repository-level type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a remote repository and the branch to document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDetails {
    pub owner: String,
    pub repo: String,
    /// Branch to clone; the repository's default branch when `None`
    pub branch: Option<String>,
}

impl RepoDetails {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

impl fmt::Display for RepoDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.branch {
            Some(branch) => write!(f, "{}/{}@{}", self.owner, self.repo, branch),
            None => write!(f, "{}/{}", self.owner, self.repo),
        }
    }
}

/// Repository metadata used by the overview prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub name: String,
    pub description: Option<String>,
    pub primary_language: Option<String>,
    pub star_count: u64,
    pub fork_count: u64,
    pub open_issue_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub license: String,
    pub default_branch: String,
}

impl RepoMetadata {
    /// Metadata for a directory documented without a remote source
    pub fn local(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            primary_language: None,
            star_count: 0,
            fork_count: 0,
            open_issue_count: 0,
            created_at: now,
            updated_at: now,
            license: "No license".to_string(),
            default_branch: "main".to_string(),
        }
    }
}
