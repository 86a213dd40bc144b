//! Durable storage for the data directory: refresh before a scan, publish after.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{0} is not a repository and no remote is configured")]
    NotARepository(PathBuf),
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {code:?}: {stderr}")]
    Command {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Somewhere the data files live between runs.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Bring the local copy up to date.
    async fn pull(&self) -> Result<(), SyncError>;

    /// Publish local changes under `message`.
    async fn push(&self, message: &str) -> Result<(), SyncError>;
}

/// No remote: data stays in the local directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalOnly;

#[async_trait]
impl DurableStore for LocalOnly {
    async fn pull(&self) -> Result<(), SyncError> {
        Ok(())
    }

    async fn push(&self, _message: &str) -> Result<(), SyncError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_only_is_a_no_op() {
        let store: Box<dyn DurableStore> = Box::new(LocalOnly);
        store.pull().await.unwrap();
        store.push("Auto update").await.unwrap();
    }

    #[test]
    fn command_error_names_the_command() {
        let err = SyncError::Command {
            command: "git push".into(),
            code: Some(128),
            stderr: "rejected".into(),
        };
        assert_eq!(err.to_string(), "`git push` exited with Some(128): rejected");
    }
}
