//! Shutdown on SIGINT / SIGTERM (Ctrl-C elsewhere).
//!
//! [`SigDown`] turns the first shutdown signal into a cancelled
//! [`CancellationToken`]; the read loop selects on it and the host then
//! closes the session and drains event delivery.

use std::fmt;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Watches for shutdown signals.
pub struct SigDown {
    watcher: TaskTracker,
    token: CancellationToken,
}

impl fmt::Debug for SigDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigDown")
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl SigDown {
    /// Installs the signal handlers. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// The I/O error from registering a handler.
    #[allow(clippy::unnecessary_wraps)] // only fallible on Unix
    pub fn try_new() -> Result<Self, std::io::Error> {
        let token = CancellationToken::new();
        let watcher = TaskTracker::new();
        let trigger = token.clone();

        #[cfg(unix)]
        {
            let mut terminate = signal(SignalKind::terminate())?;
            let mut interrupt = signal(SignalKind::interrupt())?;
            watcher.spawn(async move {
                let name = tokio::select! {
                    _ = terminate.recv() => "SIGTERM",
                    _ = interrupt.recv() => "SIGINT",
                    () = trigger.cancelled() => return,
                };
                tracing::info!(signal = name, "shutting down");
                trigger.cancel();
            });
        }

        #[cfg(not(unix))]
        {
            watcher.spawn(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!(signal = "ctrl-c", "shutting down");
                        trigger.cancel();
                    }
                    () = trigger.cancelled() => {}
                }
            });
        }

        watcher.close();
        Ok(Self { watcher, token })
    }

    /// Token cancelled on the first signal.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancels without a signal, e.g. when stdin closes, and waits for the
    /// watcher task to exit.
    pub async fn finish(&self) {
        self.token.cancel();
        self.watcher.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finish_cancels_and_stops_the_watcher() {
        let sig_down = SigDown::try_new().unwrap();
        let token = sig_down.token();
        assert!(!token.is_cancelled());
        sig_down.finish().await;
        assert!(token.is_cancelled());
        assert!(sig_down.watcher.is_empty());
    }
}
