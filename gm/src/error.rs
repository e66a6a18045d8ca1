//! Error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the single-instance guard
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Application instance already running (lock held on {path})")]
    AlreadyRunning { path: PathBuf },

    #[error("Failed to open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock {path}: {source}")]
    Acquire {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove lock file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from invoking the git executable
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to run git {args}: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {args} exited with status {code}: {stderr}")]
    Failed { args: String, code: i32, stderr: String },

    #[error("git {args} timed out after {timeout_secs}s")]
    Timeout { args: String, timeout_secs: u64 },
}

/// Fatal startup conditions of the orchestrator
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("No repositories given")]
    NoRepositories,

    #[error("Failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),
}
