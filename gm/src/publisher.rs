//! Commit-and-push

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use tokio::time::Instant;
use tracing::{debug, error};

use crate::error::GitError;
use crate::git::Vcs;
use crate::repo::MonitoredRepository;

/// Deadline shared by the commit and push of one publish
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(60);

/// Remote that changes are pushed to
pub const REMOTE: &str = "origin";

/// Branch that changes are pushed to
pub const BRANCH: &str = "main";

/// Auto-generated commit message, e.g. `Auto Commit 19 Oct 26 14:03 +0000`
pub fn commit_message<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Auto Commit {}", now.format("%d %b %y %H:%M %z"))
}

/// Commits every tracked modification and pushes it to `origin main`
#[derive(Clone)]
pub struct Publisher {
    vcs: Arc<dyn Vcs>,
    timeout: Duration,
}

impl Publisher {
    pub fn new(vcs: Arc<dyn Vcs>) -> Self {
        Self {
            vcs,
            timeout: PUBLISH_TIMEOUT,
        }
    }

    /// Override the deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Commit then push, both under one deadline
    ///
    /// A failed commit skips the push. Failures are logged with the stage
    /// that failed; the caller only sees the outcome.
    pub async fn publish(&self, repo: &MonitoredRepository) -> bool {
        debug!(%repo, "Publisher::publish: called");
        let deadline = Instant::now() + self.timeout;
        let message = commit_message(&Local::now());

        let commit = self.vcs.commit_all(repo.path(), &message);
        if let Err(e) = self.before_deadline(deadline, "commit -am", commit).await {
            error!(%repo, stage = "commit", error = %e, "Error committing changes for {}", repo);
            return false;
        }

        let push = self.vcs.push(repo.path(), REMOTE, BRANCH);
        if let Err(e) = self.before_deadline(deadline, "push", push).await {
            error!(%repo, stage = "push", error = %e, "Error pushing changes for {}", repo);
            return false;
        }

        debug!(%repo, %message, "Publisher::publish: committed and pushed");
        true
    }

    async fn before_deadline<F>(&self, deadline: Instant, args: &str, op: F) -> Result<(), GitError>
    where
        F: Future<Output = Result<(), GitError>>,
    {
        match tokio::time::timeout_at(deadline, op).await {
            Ok(result) => result,
            Err(_) => Err(GitError::Timeout {
                args: args.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}
