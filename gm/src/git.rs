//! Git command collaborator
//!
//! Everything gitmon needs from version control goes through the [`Vcs`]
//! trait: a status probe, a porcelain status probe, commit-all and push.
//! [`GitCli`] shells out to the git executable.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::GitError;

/// Version-control operations used by the monitor
#[async_trait]
pub trait Vcs: Send + Sync {
    /// `status`; succeeds iff `repo` is a usable working directory
    async fn status(&self, repo: &Path) -> Result<(), GitError>;

    /// `status --porcelain`; returns the raw machine-readable output
    async fn status_porcelain(&self, repo: &Path) -> Result<Vec<u8>, GitError>;

    /// `commit -am <message>`
    async fn commit_all(&self, repo: &Path, message: &str) -> Result<(), GitError>;

    /// `push <remote> <branch>`
    async fn push(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), GitError>;
}

/// [`Vcs`] backed by the git executable
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    /// Run `git -C <repo> <args>` and return stdout
    ///
    /// Dropping the returned future kills the child process.
    async fn run(&self, repo: &Path, args: &[&str]) -> Result<Vec<u8>, GitError> {
        debug!(?repo, ?args, "GitCli::run: called");
        let output = Command::new(&self.binary)
            .arg("-C")
            .arg(repo)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| GitError::Spawn {
                args: args.join(" "),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(code = ?output.status.code(), %stderr, "GitCli::run: command failed");
            return Err(GitError::Failed {
                args: args.join(" "),
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        debug!(stdout_len = output.stdout.len(), "GitCli::run: command succeeded");
        Ok(output.stdout)
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn status(&self, repo: &Path) -> Result<(), GitError> {
        self.run(repo, &["status"]).await.map(|_| ())
    }

    async fn status_porcelain(&self, repo: &Path) -> Result<Vec<u8>, GitError> {
        self.run(repo, &["status", "--porcelain"]).await
    }

    async fn commit_all(&self, repo: &Path, message: &str) -> Result<(), GitError> {
        self.run(repo, &["commit", "-am", message]).await.map(|_| ())
    }

    async fn push(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run(repo, &["push", remote, branch]).await.map(|_| ())
    }
}
