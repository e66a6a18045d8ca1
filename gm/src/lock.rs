//! Single-instance process guard
//!
//! Only one gitmon may run per host. The guard is an OS-level exclusive
//! advisory lock on a well-known file in the temporary directory.
//!
//! # Invariants
//!
//! - Acquisition is non-blocking: a held lock fails fast with
//!   [`LockError::AlreadyRunning`]
//! - The lock file's contents and existence carry no meaning, only the lock
//!   state does. A stale file from a crashed run is reused as-is.
//! - If the process dies, the OS drops the lock when its handles close

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fs2::FileExt;
use tracing::debug;

use crate::error::LockError;

/// Name of the lock file inside the lock directory
pub const LOCK_FILE_NAME: &str = "gitmon.pid";

/// Acquire/release capability for the process-wide guard
pub trait InstanceLock: Send + Sync {
    /// Proof that the lock is held; dropping it without `release` still frees the lock
    type Guard: Send;

    /// Try to take the lock without blocking
    fn acquire(&self) -> Result<Self::Guard, LockError>;

    /// Release the lock and clean up its backing resource
    ///
    /// The lock is free once this returns, even when it returns an error.
    fn release(&self, guard: Self::Guard) -> Result<(), LockError>;
}

/// Advisory lock backed by a file
#[derive(Debug, Clone)]
pub struct FileLock {
    dir: PathBuf,
    file_name: String,
}

impl FileLock {
    /// Create a lock for `dir/file_name`
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    /// Lock file in the system temporary directory
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir(), LOCK_FILE_NAME)
    }

    /// Full path of the lock file
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Open handle holding the exclusive lock
#[derive(Debug)]
pub struct FileLockGuard {
    path: PathBuf,
    file: File,
}

impl FileLockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InstanceLock for FileLock {
    type Guard = FileLockGuard;

    fn acquire(&self) -> Result<FileLockGuard, LockError> {
        let path = self.path();
        debug!(?path, "FileLock::acquire: called");

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        // On error the handle is dropped here, closing it
        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(?path, "FileLock::acquire: lock held");
                Ok(FileLockGuard { path, file })
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                debug!(?path, "FileLock::acquire: lock contended");
                Err(LockError::AlreadyRunning { path })
            }
            Err(source) => Err(LockError::Acquire { path, source }),
        }
    }

    fn release(&self, guard: FileLockGuard) -> Result<(), LockError> {
        let FileLockGuard { path, file } = guard;
        debug!(?path, "FileLock::release: called");

        // Closing the handle is what releases the lock
        drop(file);

        std::fs::remove_file(&path).map_err(|source| LockError::Remove { path, source })
    }
}

/// In-process guard for tests and embedding
///
/// Clones share the same lock state.
#[derive(Debug, Clone, Default)]
pub struct MemoryLock {
    held: Arc<AtomicBool>,
}

impl MemoryLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

/// Guard for [`MemoryLock`]; frees the lock on drop like a closed file handle
#[derive(Debug)]
pub struct MemoryLockGuard {
    held: Arc<AtomicBool>,
}

impl Drop for MemoryLockGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::SeqCst);
    }
}

impl InstanceLock for MemoryLock {
    type Guard = MemoryLockGuard;

    fn acquire(&self) -> Result<MemoryLockGuard, LockError> {
        if self.held.swap(true, Ordering::SeqCst) {
            return Err(LockError::AlreadyRunning {
                path: PathBuf::from("<memory>"),
            });
        }
        Ok(MemoryLockGuard {
            held: Arc::clone(&self.held),
        })
    }

    fn release(&self, guard: MemoryLockGuard) -> Result<(), LockError> {
        drop(guard);
        Ok(())
    }
}
