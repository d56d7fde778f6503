//! GitHub REST metadata and shallow clones

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use super::RepositorySource;
use crate::ai::timeout::with_timeout;
use crate::config::GithubConfig;
use crate::constants::github::USER_AGENT;
use crate::types::{DocError, RepoMetadata, Result, ResultExt};

const NO_LICENSE: &str = "No license";

/// GitHub-backed repository source
pub struct GitHubSource {
    client: reqwest::Client,
    api_base: String,
    clone_base: String,
    /// Never exposed in logs or debug output
    token: Option<SecretString>,
    temp_dir: PathBuf,
    clone_timeout: Duration,
}

impl std::fmt::Debug for GitHubSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSource")
            .field("api_base", &self.api_base)
            .field("clone_base", &self.clone_base)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("temp_dir", &self.temp_dir)
            .finish()
    }
}

impl GitHubSource {
    pub fn new(
        config: &GithubConfig,
        temp_dir: impl Into<PathBuf>,
        request_timeout: Duration,
        clone_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| DocError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_url.trim_end_matches('/').to_string(),
            clone_base: config.clone_url.trim_end_matches('/').to_string(),
            token: config
                .token
                .as_ref()
                .map(|t| SecretString::from(t.clone())),
            temp_dir: temp_dir.into(),
            clone_timeout,
        })
    }

    /// Local directory a repository is cloned into
    pub fn clone_target(&self, owner: &str, repo: &str) -> PathBuf {
        self.temp_dir.join(format!("{}_{}", owner, repo))
    }

    fn clone_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/{}/{}.git", self.clone_base, owner, repo)
    }
}

/// Owner and repository names end up in URLs and directory names
fn validate_name(kind: &str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(DocError::Config(format!("Invalid repository {}: '{}'", kind, value)))
    }
}

#[async_trait]
impl RepositorySource for GitHubSource {
    #[instrument(skip(self))]
    async fn get_metadata(&self, owner: &str, repo: &str) -> Result<RepoMetadata> {
        validate_name("owner", owner)?;
        validate_name("name", repo)?;

        let url = format!("{}/repos/{}/{}", self.api_base, owner, repo);
        debug!("Requesting repository metadata: {}", url);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.fetch_context("repository metadata")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocError::fetch(
                "repository metadata",
                format!("GitHub API returned {}: {}", status, body),
            ));
        }

        let data: GitHubRepository = response.json().await.fetch_context("repository metadata")?;
        Ok(data.into())
    }

    #[instrument(skip(self))]
    async fn fetch_tree(&self, owner: &str, repo: &str, branch: &str) -> Result<PathBuf> {
        validate_name("owner", owner)?;
        validate_name("name", repo)?;

        let target = self.clone_target(owner, repo);
        let url = self.clone_url(owner, repo);

        tokio::fs::create_dir_all(&self.temp_dir)
            .await
            .fetch_context("prepare clone directory")?;
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            debug!("Removing stale clone: {}", target.display());
            tokio::fs::remove_dir_all(&target)
                .await
                .fetch_context("remove stale clone")?;
        }

        info!("Cloning {} (branch: {})", url, branch);

        let mut cmd = Command::new("git");
        cmd.args(["clone", "--depth", "1", "--branch", branch, "--"])
            .arg(&url)
            .arg(&target)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = with_timeout(
            self.clone_timeout,
            async { cmd.output().await.fetch_context("git clone") },
            "git clone",
        )
        .await
        .map_err(|e| match e {
            DocError::Timeout { .. } => DocError::fetch("git clone", e.to_string()),
            other => other,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                format!("git exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            };
            return Err(DocError::fetch("git clone", message));
        }

        Ok(target)
    }
}

// Response types

#[derive(Debug, Deserialize)]
struct GitHubRepository {
    name: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    license: Option<GitHubLicense>,
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct GitHubLicense {
    name: Option<String>,
}

impl From<GitHubRepository> for RepoMetadata {
    fn from(data: GitHubRepository) -> Self {
        Self {
            name: data.name,
            description: data.description.filter(|d| !d.trim().is_empty()),
            primary_language: data.language,
            star_count: data.stargazers_count,
            fork_count: data.forks_count,
            open_issue_count: data.open_issues_count,
            created_at: data.created_at,
            updated_at: data.updated_at,
            license: data
                .license
                .and_then(|l| l.name)
                .unwrap_or_else(|| NO_LICENSE.to_string()),
            default_branch: data.default_branch,
        }
    }
}
