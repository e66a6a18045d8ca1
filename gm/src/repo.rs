//! Monitored repositories and startup validation

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::git::Vcs;

/// An absolute path known to be a usable git working directory
///
/// Only [`RepositoryValidator`] creates these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonitoredRepository {
    path: PathBuf,
}

impl MonitoredRepository {
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn unchecked(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl fmt::Display for MonitoredRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Resolve a command-line argument to an absolute path
///
/// Relative paths are joined onto the current directory lexically; the path
/// need not exist.
pub fn resolve_path(arg: &Path) -> std::io::Result<PathBuf> {
    std::path::absolute(arg)
}

/// Checks that paths exist and pass a `status` probe
#[derive(Clone)]
pub struct RepositoryValidator {
    vcs: Arc<dyn Vcs>,
}

impl RepositoryValidator {
    pub fn new(vcs: Arc<dyn Vcs>) -> Self {
        Self { vcs }
    }

    /// True iff `path` exists and `status` succeeds in it
    pub async fn validate(&self, path: &Path) -> bool {
        debug!(?path, "RepositoryValidator::validate: called");
        if !matches!(tokio::fs::try_exists(path).await, Ok(true)) {
            debug!(?path, "RepositoryValidator::validate: path does not exist");
            return false;
        }

        match self.vcs.status(path).await {
            Ok(()) => true,
            Err(e) => {
                debug!(?path, error = %e, "RepositoryValidator::validate: status probe failed");
                false
            }
        }
    }

    /// Resolve and validate one command-line argument
    ///
    /// Every failure is logged and yields `None`.
    pub async fn admit(&self, arg: &Path) -> Option<MonitoredRepository> {
        let path = match resolve_path(arg) {
            Ok(path) => path,
            Err(e) => {
                warn!(arg = %arg.display(), error = %e, "Invalid path: {}", arg.display());
                return None;
            }
        };

        if !self.validate(&path).await {
            warn!(repo = %path.display(), "Invalid Git repository: {}", path.display());
            return None;
        }

        Some(MonitoredRepository { path })
    }
}
