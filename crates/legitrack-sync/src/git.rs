//! Git-backed [`DurableStore`]: the data directory is a git working copy.

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::durable::{DurableStore, SyncError};

/// Commit message used after a scan.
pub const AUTO_UPDATE_MESSAGE: &str = "Auto update";

#[derive(Debug, Clone)]
pub struct GitStore {
    repo_dir: PathBuf,
    remote_url: Option<String>,
}

impl GitStore {
    pub fn new(repo_dir: impl Into<PathBuf>, remote_url: Option<String>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote_url,
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Clone the remote into `repo_dir` if there is no working copy yet.
    pub async fn ensure_clone(&self) -> Result<(), SyncError> {
        if self.repo_dir.join(".git").exists() {
            return Ok(());
        }
        let Some(url) = &self.remote_url else {
            return Err(SyncError::NotARepository(self.repo_dir.clone()));
        };
        info!(url = %url, dir = %self.repo_dir.display(), "cloning data repository");
        let dir = self.repo_dir.to_string_lossy();
        checked("git clone", run(None, &["clone", url.as_str(), &*dir]).await?)?;
        Ok(())
    }

    async fn git(&self, args: &[&str]) -> Result<Output, SyncError> {
        run(Some(&self.repo_dir), args).await
    }
}

async fn run(dir: Option<&Path>, args: &[&str]) -> Result<Output, SyncError> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    debug!(args = ?args, "running git");
    cmd.output().await.map_err(|source| SyncError::Spawn {
        command: format!("git {}", args.join(" ")),
        source,
    })
}

fn checked(command: &str, output: Output) -> Result<Output, SyncError> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(SyncError::Command {
            command: command.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[async_trait]
impl DurableStore for GitStore {
    async fn pull(&self) -> Result<(), SyncError> {
        self.ensure_clone().await?;
        checked("git pull", self.git(&["pull"]).await?)?;
        info!(dir = %self.repo_dir.display(), "pulled data repository");
        Ok(())
    }

    /// Commit local changes, merge the remote's, then push.
    async fn push(&self, message: &str) -> Result<(), SyncError> {
        self.ensure_clone().await?;
        checked("git add", self.git(&["add", "."]).await?)?;
        // Exits non-zero when there is nothing to commit.
        let commit = self.git(&["commit", "-am", message]).await?;
        if !commit.status.success() {
            warn!(
                stdout = %String::from_utf8_lossy(&commit.stdout).trim(),
                "git commit made no commit"
            );
        }
        checked(
            "git pull",
            self.git(&["pull", "--no-rebase", "--no-edit"]).await?,
        )?;
        checked("git push", self.git(&["push"]).await?)?;
        info!(dir = %self.repo_dir.display(), "pushed data repository");
        Ok(())
    }
}
