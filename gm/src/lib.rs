//! gitmon - automatic commit-and-push for git working directories
//!
//! gitmon polls a set of independent working directories and, whenever one
//! has uncommitted changes, commits them with a timestamped message and
//! pushes to `origin main`.
//!
//! # Core Concepts
//!
//! - **Single instance**: an OS advisory lock keeps one gitmon per host
//! - **One supervisor per repository**: each polls on its own timer
//! - **Detached publishing**: a slow push never delays the next poll
//! - **Serialised publishing**: one process-wide mutex orders every commit cycle
//! - **Cooperative shutdown**: SIGINT/SIGTERM fire one broadcast cancellation
//!
//! # Modules
//!
//! - [`orchestrator`] - Startup, supervisor fleet and shutdown
//! - [`supervisor`] - Per-repository polling loop
//! - [`cycle`] - Commit cycles and their detached dispatch
//! - [`publisher`] - Commit and push under one deadline
//! - [`detector`] - Uncommitted-change detection
//! - [`repo`] - Path resolution and repository validation
//! - [`lock`] - Single-instance guard
//! - [`git`] - git command collaborator
//! - [`shutdown`] - Fire-once shutdown broadcast
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod cycle;
pub mod detector;
pub mod error;
pub mod git;
pub mod lock;
pub mod orchestrator;
pub mod publisher;
pub mod repo;
pub mod shutdown;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::Config;
pub use cycle::{CommitCycle, CycleDispatcher, CycleOutcome};
pub use detector::ChangeDetector;
pub use error::{GitError, LockError, OrchestratorError};
pub use git::{GitCli, Vcs};
pub use lock::{FileLock, InstanceLock, LOCK_FILE_NAME, MemoryLock};
pub use orchestrator::{Orchestrator, RunSummary};
pub use publisher::{BRANCH, PUBLISH_TIMEOUT, Publisher, REMOTE, commit_message};
pub use repo::{MonitoredRepository, RepositoryValidator, resolve_path};
pub use shutdown::ShutdownSignal;
pub use supervisor::{POLL_INTERVAL, RepositorySupervisor, SupervisorState};
