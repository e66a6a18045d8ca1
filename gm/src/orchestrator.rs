//! Top-level coordination
//!
//! Startup order: take the single-instance guard, reject an empty repository
//! list, admit each repository and spawn its supervisor, listen for
//! termination signals, then wait for every supervisor before releasing the
//! guard.
//!
//! Arguments that fail validation are skipped. If none pass, the
//! orchestrator still waits for a signal with no supervisors running.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cycle::{CommitCycle, CycleDispatcher};
use crate::detector::ChangeDetector;
use crate::error::OrchestratorError;
use crate::git::Vcs;
use crate::lock::InstanceLock;
use crate::publisher::Publisher;
use crate::repo::RepositoryValidator;
use crate::shutdown::ShutdownSignal;
use crate::supervisor::{POLL_INTERVAL, RepositorySupervisor};

/// What a completed run looked like
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Supervisors spawned, one per admitted repository
    pub supervisors: usize,
    /// Arguments rejected during validation
    pub skipped: usize,
    /// Commit cycles still running when the supervisors had all stopped
    pub in_flight_at_exit: usize,
}

/// Owns the guard, the shared publish lock and every supervisor
pub struct Orchestrator<L: InstanceLock> {
    lock: L,
    validator: RepositoryValidator,
    detector: ChangeDetector,
    dispatcher: Arc<CycleDispatcher>,
    poll_interval: Duration,
    os_signals: bool,
}

impl<L: InstanceLock> Orchestrator<L> {
    pub fn new(lock: L, vcs: Arc<dyn Vcs>) -> Self {
        Self::with_publisher(lock, vcs.clone(), Publisher::new(vcs))
    }

    /// Build with a preconfigured publisher
    pub fn with_publisher(lock: L, vcs: Arc<dyn Vcs>, publisher: Publisher) -> Self {
        let detector = ChangeDetector::new(vcs.clone());
        let publish_lock = Arc::new(Mutex::new(()));
        let cycle = CommitCycle::new(detector.clone(), publisher, publish_lock);
        Self {
            lock,
            validator: RepositoryValidator::new(vcs),
            detector,
            dispatcher: Arc::new(CycleDispatcher::new(cycle)),
            poll_interval: POLL_INTERVAL,
            os_signals: true,
        }
    }

    /// Override the supervisors' polling interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Don't listen for SIGINT/SIGTERM; only an explicit fire stops the run
    pub fn without_os_signals(mut self) -> Self {
        self.os_signals = false;
        self
    }

    /// Dispatcher shared by every supervisor
    pub fn dispatcher(&self) -> Arc<CycleDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Monitor `repos` until `shutdown` fires
    ///
    /// Returns an error only for fatal startup conditions, before any
    /// monitoring begins.
    pub async fn run(self, repos: Vec<PathBuf>, shutdown: ShutdownSignal) -> Result<RunSummary, OrchestratorError> {
        debug!(?repos, "Orchestrator::run: called");
        let guard = self.lock.acquire()?;
        debug!("Orchestrator::run: instance lock acquired");

        if repos.is_empty() {
            self.release(guard);
            return Err(OrchestratorError::NoRepositories);
        }

        let listener = if self.os_signals {
            match shutdown.listen_for_os_signals() {
                Ok(listener) => Some(listener),
                Err(e) => {
                    self.release(guard);
                    return Err(OrchestratorError::Signals(e));
                }
            }
        } else {
            None
        };

        let mut supervisors = JoinSet::new();
        let mut skipped = 0;
        for arg in &repos {
            let Some(repo) = self.validator.admit(arg).await else {
                skipped += 1;
                continue;
            };

            info!(%repo, "Monitoring changes in {}", repo);
            let supervisor = RepositorySupervisor::new(repo, self.detector.clone(), self.dispatcher())
                .with_interval(self.poll_interval);
            supervisors.spawn(supervisor.run(shutdown.clone()));
        }

        let spawned = supervisors.len();
        if spawned == 0 {
            warn!("No valid repositories to monitor; waiting for shutdown");
        }

        // A run with no supervisors still lasts until shutdown
        shutdown.fired().await;
        while let Some(result) = supervisors.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Supervisor task ended abnormally");
            }
        }

        if let Some(listener) = listener {
            listener.abort();
        }

        let in_flight_at_exit = self.dispatcher.in_flight();
        if in_flight_at_exit > 0 {
            info!(in_flight_at_exit, "Commit cycles still in flight at shutdown");
        }

        self.release(guard);
        info!("Shutting down...");

        Ok(RunSummary {
            supervisors: spawned,
            skipped,
            in_flight_at_exit,
        })
    }

    fn release(&self, guard: L::Guard) {
        if let Err(e) = self.lock.release(guard) {
            warn!(error = %e, "Failed to clean up instance lock");
        }
    }
}
