//! Commit cycles and their detached dispatch
//!
//! A commit cycle is one attempt to publish a repository's pending changes.
//! Cycles are spawned detached from the polling loop, and a single
//! process-wide mutex serialises every cycle across all repositories:
//! detection runs in parallel, publishing never does.
//!
//! Because a cycle may wait on the mutex while another cycle commits the
//! same changes, it checks for changes again once it holds the mutex.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::detector::ChangeDetector;
use crate::publisher::Publisher;
use crate::repo::MonitoredRepository;

/// How a commit cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Committed and pushed
    Published,
    /// Commit or push failed; retried on a later tick if changes remain
    Failed,
    /// Nothing left to commit once the mutex was held
    NoChanges,
}

/// One commit-and-push attempt, serialised by a shared mutex
#[derive(Clone)]
pub struct CommitCycle {
    detector: ChangeDetector,
    publisher: Publisher,
    publish_lock: Arc<Mutex<()>>,
}

impl CommitCycle {
    pub fn new(detector: ChangeDetector, publisher: Publisher, publish_lock: Arc<Mutex<()>>) -> Self {
        Self {
            detector,
            publisher,
            publish_lock,
        }
    }

    pub async fn run(&self, repo: &MonitoredRepository) -> CycleOutcome {
        debug!(%repo, "CommitCycle::run: waiting for publish lock");
        let _held = self.publish_lock.lock().await;

        if !self.detector.has_changes(repo.path()).await {
            debug!(%repo, "CommitCycle::run: changes already committed");
            return CycleOutcome::NoChanges;
        }

        if self.publisher.publish(repo).await {
            info!(%repo, "Changes committed and pushed for {}", repo);
            CycleOutcome::Published
        } else {
            error!(%repo, "Failed to commit and push changes for {}", repo);
            CycleOutcome::Failed
        }
    }
}

/// Spawns commit cycles without waiting for them
///
/// Callers never join a dispatched cycle. [`CycleDispatcher::drain`] exists
/// so tests can wait for everything in flight.
pub struct CycleDispatcher {
    cycle: CommitCycle,
    tracker: TaskTracker,
    dispatched: AtomicUsize,
}

impl CycleDispatcher {
    pub fn new(cycle: CommitCycle) -> Self {
        Self {
            cycle,
            tracker: TaskTracker::new(),
            dispatched: AtomicUsize::new(0),
        }
    }

    /// Start a cycle for `repo` and return immediately
    pub fn dispatch(&self, repo: MonitoredRepository) -> JoinHandle<CycleOutcome> {
        let count = self.dispatched.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%repo, count, "CycleDispatcher::dispatch: spawning cycle");
        let cycle = self.cycle.clone();
        self.tracker.spawn(async move { cycle.run(&repo).await })
    }

    /// Cycles dispatched so far
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Cycles still running or queued on the publish lock
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every cycle dispatched so far has finished
    pub async fn drain(&self) {
        debug!(in_flight = self.in_flight(), "CycleDispatcher::drain: called");
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
