//! Scripted [`Vcs`] used by unit tests

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::GitError;
use crate::git::Vcs;

/// In-memory stand-in for git
///
/// A repository is valid unless marked invalid, and has changes while it is
/// marked dirty. A successful commit cleans it.
#[derive(Debug, Default)]
pub(crate) struct FakeVcs {
    invalid: Mutex<HashSet<PathBuf>>,
    dirty: Mutex<HashSet<PathBuf>>,
    fail_porcelain: AtomicBool,
    fail_commit: AtomicBool,
    fail_push: AtomicBool,
    commit_delay: Mutex<Duration>,
    push_delay: Mutex<Duration>,
    porcelain_calls: AtomicUsize,
    commits: Mutex<Vec<(PathBuf, String)>>,
    pushes: Mutex<Vec<(PathBuf, String, String)>>,
    active_commits: AtomicUsize,
    max_active_commits: AtomicUsize,
}

impl FakeVcs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mark_invalid(&self, repo: &Path) {
        self.invalid.lock().unwrap().insert(repo.to_path_buf());
    }

    pub(crate) fn mark_dirty(&self, repo: &Path) {
        self.dirty.lock().unwrap().insert(repo.to_path_buf());
    }

    pub(crate) fn is_dirty(&self, repo: &Path) -> bool {
        self.dirty.lock().unwrap().contains(repo)
    }

    pub(crate) fn fail_porcelain(&self, fail: bool) {
        self.fail_porcelain.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_commit(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_push(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_commit_delay(&self, delay: Duration) {
        *self.commit_delay.lock().unwrap() = delay;
    }

    pub(crate) fn set_push_delay(&self, delay: Duration) {
        *self.push_delay.lock().unwrap() = delay;
    }

    pub(crate) fn porcelain_calls(&self) -> usize {
        self.porcelain_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn commits(&self) -> Vec<(PathBuf, String)> {
        self.commits.lock().unwrap().clone()
    }

    pub(crate) fn pushes(&self) -> Vec<(PathBuf, String, String)> {
        self.pushes.lock().unwrap().clone()
    }

    pub(crate) fn max_active_commits(&self) -> usize {
        self.max_active_commits.load(Ordering::SeqCst)
    }

    fn failed(args: &str) -> GitError {
        GitError::Failed {
            args: args.to_string(),
            code: 1,
            stderr: "scripted failure".to_string(),
        }
    }
}

#[async_trait]
impl Vcs for FakeVcs {
    async fn status(&self, repo: &Path) -> Result<(), GitError> {
        if self.invalid.lock().unwrap().contains(repo) {
            return Err(Self::failed("status"));
        }
        Ok(())
    }

    async fn status_porcelain(&self, repo: &Path) -> Result<Vec<u8>, GitError> {
        self.porcelain_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_porcelain.load(Ordering::SeqCst) {
            return Err(Self::failed("status --porcelain"));
        }
        if self.is_dirty(repo) {
            Ok(b" M README.md\n".to_vec())
        } else {
            Ok(Vec::new())
        }
    }

    async fn commit_all(&self, repo: &Path, message: &str) -> Result<(), GitError> {
        let active = self.active_commits.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_commits.fetch_max(active, Ordering::SeqCst);

        let delay = *self.commit_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        let result = if self.fail_commit.load(Ordering::SeqCst) {
            Err(Self::failed("commit -am"))
        } else {
            self.dirty.lock().unwrap().remove(repo);
            self.commits
                .lock()
                .unwrap()
                .push((repo.to_path_buf(), message.to_string()));
            Ok(())
        };

        self.active_commits.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn push(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
        let delay = *self.push_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        if self.fail_push.load(Ordering::SeqCst) {
            return Err(Self::failed("push"));
        }
        self.pushes
            .lock()
            .unwrap()
            .push((repo.to_path_buf(), remote.to_string(), branch.to_string()));
        Ok(())
    }
}
