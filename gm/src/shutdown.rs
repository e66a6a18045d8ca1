//! Process-wide shutdown signal
//!
//! A broadcast cancellation that fires at most once. Supervisors wait on it
//! at every suspension point alongside their timer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Fire-once broadcast of "stop monitoring"
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
    fired: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal; returns true only for the call that fired it
    pub fn fire(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            debug!("ShutdownSignal::fire: already fired");
            return false;
        }
        self.token.cancel();
        true
    }

    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has fired
    pub async fn fired(&self) {
        self.token.cancelled().await
    }

    /// Fire on the first SIGINT or SIGTERM
    ///
    /// Handlers are registered before this returns. The listener task ends
    /// after the first signal, or when the shutdown fires some other way.
    pub fn listen_for_os_signals(&self) -> std::io::Result<JoinHandle<()>> {
        debug!("ShutdownSignal::listen_for_os_signals: installing handlers");
        let shutdown = self.clone();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigint = signal(SignalKind::interrupt())?;
            let mut sigterm = signal(SignalKind::terminate())?;

            Ok(tokio::spawn(async move {
                let name = tokio::select! {
                    _ = sigint.recv() => "SIGINT",
                    _ = sigterm.recv() => "SIGTERM",
                    _ = shutdown.fired() => return,
                };
                info!(signal = name, "Received signal: {}", name);
                shutdown.fire();
            }))
        }

        #[cfg(not(unix))]
        {
            Ok(tokio::spawn(async move {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        if result.is_ok() {
                            info!(signal = "ctrl-c", "Received signal: ctrl-c");
                            shutdown.fire();
                        }
                    }
                    _ = shutdown.fired() => {}
                }
            }))
        }
    }
}
