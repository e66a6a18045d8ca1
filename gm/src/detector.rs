//! Uncommitted-change detection

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::git::Vcs;

/// Asks git whether a working directory has uncommitted modifications
#[derive(Clone)]
pub struct ChangeDetector {
    vcs: Arc<dyn Vcs>,
}

impl ChangeDetector {
    pub fn new(vcs: Arc<dyn Vcs>) -> Self {
        Self { vcs }
    }

    /// True iff `status --porcelain` prints anything
    ///
    /// Probe errors are logged and reported as "no changes" so a broken
    /// repository only skips the cycle.
    pub async fn has_changes(&self, repo: &Path) -> bool {
        match self.vcs.status_porcelain(repo).await {
            Ok(output) => {
                let changed = !output.is_empty();
                debug!(?repo, changed, "ChangeDetector::has_changes: probed");
                changed
            }
            Err(e) => {
                warn!(repo = %repo.display(), error = %e, "Error checking status for {}", repo.display());
                false
            }
        }
    }
}
