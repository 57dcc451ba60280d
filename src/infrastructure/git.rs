//! Git operations
//!
//! Branch gating and commit provenance for deployments. Git is optional:
//! outside a repository (or before the first commit) both queries return
//! `None` and the caller decides how to degrade.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

use crate::tools::{get_tool_path, tools};

/// Source control metadata consulted by a deployment
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Current branch, or `None` if there is no repository or no commit yet
    async fn current_branch(&self) -> Option<String>;

    /// Full commit hash of HEAD
    async fn commit_hash(&self) -> Option<String>;
}

/// Client for git operations
pub struct GitClient {
    /// Working directory for git commands
    working_dir: Option<PathBuf>,
}

impl Default for GitClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GitClient {
    /// Create a new git client for current directory
    pub fn new() -> Self {
        Self { working_dir: None }
    }

    /// Create a git client for a specific directory
    pub fn in_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(path.into()),
        }
    }

    /// Run git and return trimmed stdout on success
    async fn run(&self, args: &[&str]) -> Option<String> {
        let mut cmd = Command::new(get_tool_path(tools::GIT));
        cmd.args(args);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) => {
                debug!("git {} could not run: {}", args.join(" "), e);
                return None;
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("git {} failed: {}", args.join(" "), stderr.trim());
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            None
        } else {
            Some(stdout)
        }
    }

    /// Whether HEAD resolves to a commit
    pub async fn has_commits(&self) -> bool {
        self.run(&["rev-parse", "--verify", "HEAD"]).await.is_some()
    }

    /// Directory holding git hooks, honoring `core.hooksPath`
    pub async fn hooks_dir(&self) -> Option<PathBuf> {
        let dir = self.run(&["rev-parse", "--git-path", "hooks"]).await?;
        let path = PathBuf::from(dir);
        match (&self.working_dir, path.is_relative()) {
            (Some(base), true) => Some(base.join(path)),
            _ => Some(path),
        }
    }
}

#[async_trait]
impl SourceControl for GitClient {
    async fn current_branch(&self) -> Option<String> {
        if !self.has_commits().await {
            return None;
        }
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    async fn commit_hash(&self) -> Option<String> {
        self.run(&["rev-parse", "HEAD"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_outside_repository_reports_nothing() {
        let dir = TempDir::new().unwrap();
        let client = GitClient::in_dir(dir.path());
        // A temp dir may still sit inside a repository on some hosts
        if client.hooks_dir().await.is_none() {
            assert!(client.current_branch().await.is_none());
            assert!(client.commit_hash().await.is_none());
            assert!(!client.has_commits().await);
        }
    }

    #[tokio::test]
    async fn test_git_client_sha() {
        // This test only works in a git repo
        let client = GitClient::new();
        if let Some(sha) = client.commit_hash().await {
            assert!(sha.len() >= 40);
        }
    }
}
