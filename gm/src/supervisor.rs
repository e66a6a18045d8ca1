//! Per-repository polling loop
//!
//! ```text
//!            tick                 changes
//!   Idle ──────────▶ Polling ──────────────▶ Detected ──(dispatch cycle)──┐
//!    ▲                  │ no changes                                       │
//!    └──────────────────┴──────────────────────────────────────────────────┘
//!
//!   any state ──(shutdown fired)──▶ Stopped
//! ```
//!
//! Commit cycles are dispatched detached, so a slow publish never delays the
//! next poll. The supervisor only ends when shutdown fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cycle::CycleDispatcher;
use crate::detector::ChangeDetector;
use crate::repo::MonitoredRepository;
use crate::shutdown::ShutdownSignal;

/// Time between change checks
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Where a supervisor is in its polling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Polling,
    Detected,
    Stopped,
}

/// Polls one repository and dispatches commit cycles for it
pub struct RepositorySupervisor {
    repo: MonitoredRepository,
    detector: ChangeDetector,
    dispatcher: Arc<CycleDispatcher>,
    interval: Duration,
    state: watch::Sender<SupervisorState>,
}

impl RepositorySupervisor {
    pub fn new(repo: MonitoredRepository, detector: ChangeDetector, dispatcher: Arc<CycleDispatcher>) -> Self {
        let (state, _) = watch::channel(SupervisorState::Idle);
        Self {
            repo,
            detector,
            dispatcher,
            interval: POLL_INTERVAL,
            state,
        }
    }

    /// Override the polling interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn repo(&self) -> &MonitoredRepository {
        &self.repo
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<SupervisorState> {
        self.state.subscribe()
    }

    /// Poll until `shutdown` fires
    ///
    /// The first poll happens one interval after start.
    pub async fn run(self, shutdown: ShutdownSignal) {
        debug!(repo = %self.repo, interval = ?self.interval, "RepositorySupervisor::run: called");
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.fired() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                _ = shutdown.fired() => break,
                _ = self.poll() => {}
            }
        }

        info!(repo = %self.repo, "Stopping monitoring for {}...", self.repo);
        self.state.send_replace(SupervisorState::Stopped);
    }

    async fn poll(&self) {
        self.state.send_replace(SupervisorState::Polling);

        if self.detector.has_changes(self.repo.path()).await {
            self.state.send_replace(SupervisorState::Detected);
            debug!(repo = %self.repo, "RepositorySupervisor::poll: changes detected, dispatching cycle");
            // Detached: the loop never waits on the cycle
            let _ = self.dispatcher.dispatch(self.repo.clone());
        }

        self.state.send_replace(SupervisorState::Idle);
    }
}
