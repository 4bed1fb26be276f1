//! Connection lifecycle of the wallet SDK.
//!
//! The guard owns the only [`LiquidSdk`] handle. Operations borrow it (an
//! `Arc` clone) for one call; `connect` and `disconnect` are serialised
//! against each other and switch the state atomically, so no operation can
//! observe a half-open session.
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected --disconnect--> Disconnected
//!                               |
//!                               +--err / dropped--> Disconnected
//! ```
//!
//! The state lock is a synchronous one and is never held across an
//! `.await`, so it can always be taken, including from `Drop`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::error::BridgeError;
use crate::sdk::LiquidSdk;

/// Lifecycle state as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No session.
    Disconnected,
    /// `connect` is in progress.
    Connecting,
    /// A live handle exists.
    Connected,
}

enum SessionState {
    Disconnected,
    Connecting,
    Connected(Arc<dyn LiquidSdk>),
}

impl SessionState {
    const fn status(&self) -> SessionStatus {
        match self {
            Self::Disconnected => SessionStatus::Disconnected,
            Self::Connecting => SessionStatus::Connecting,
            Self::Connected(_) => SessionStatus::Connected,
        }
    }
}

/// Owner of the session handle.
pub struct SessionGuard {
    state: RwLock<SessionState>,
    transition: Mutex<()>,
}

impl fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.state.try_read().map(|s| s.status());
        f.debug_struct("SessionGuard")
            .field("status", &status)
            .finish_non_exhaustive()
    }
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Resets `Connecting` back to `Disconnected` if a connect future is dropped
/// before it resolves.
struct ConnectingReset<'a> {
    state: &'a RwLock<SessionState>,
    armed: bool,
}

impl Drop for ConnectingReset<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.write();
        if matches!(*state, SessionState::Connecting) {
            *state = SessionState::Disconnected;
        }
    }
}

impl SessionGuard {
    /// Creates a guard in the disconnected state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::Disconnected),
            transition: Mutex::new(()),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.read().status()
    }

    /// Moves `Disconnected` to `Connecting`, the only way into a session.
    fn begin_connect(&self) -> Result<(), BridgeError> {
        let mut state = self.state.write();
        if !matches!(*state, SessionState::Disconnected) {
            return Err(BridgeError::AlreadyInitialized);
        }
        *state = SessionState::Connecting;
        Ok(())
    }

    /// Opens a session with the handle produced by `open`.
    ///
    /// `open` only runs once the guard has moved to `Connecting`. Readers
    /// see `Connecting` as not connected until `open` resolves; on failure,
    /// or when the returned future is dropped, the guard returns to
    /// `Disconnected`.
    ///
    /// # Errors
    ///
    /// [`BridgeError::AlreadyInitialized`] unless the guard is disconnected,
    /// or whatever `open` fails with.
    pub async fn connect<F, Fut>(&self, open: F) -> Result<(), BridgeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn LiquidSdk>, BridgeError>>,
    {
        if self.status() != SessionStatus::Disconnected {
            return Err(BridgeError::AlreadyInitialized);
        }
        let _transition = self.transition.lock().await;
        self.begin_connect()?;

        let mut reset = ConnectingReset {
            state: &self.state,
            armed: true,
        };
        let outcome = open().await;
        reset.armed = false;
        let mut state = self.state.write();
        match outcome {
            Ok(sdk) => {
                *state = SessionState::Connected(sdk);
                Ok(())
            }
            Err(err) => {
                *state = SessionState::Disconnected;
                Err(err)
            }
        }
    }

    /// Borrows the live handle.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotInitialized`] unless connected.
    pub fn handle(&self) -> Result<Arc<dyn LiquidSdk>, BridgeError> {
        match &*self.state.read() {
            SessionState::Connected(sdk) => Ok(Arc::clone(sdk)),
            SessionState::Disconnected | SessionState::Connecting => {
                Err(BridgeError::NotInitialized)
            }
        }
    }

    /// Runs `f` while holding the state read lock, so a concurrent
    /// `disconnect` cannot interleave with it. `f` must not block.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotInitialized`] unless connected, or whatever `f`
    /// fails with.
    pub fn with_live<R, F>(&self, f: F) -> Result<R, BridgeError>
    where
        F: FnOnce(&Arc<dyn LiquidSdk>) -> Result<R, BridgeError>,
    {
        let state = self.state.read();
        match &*state {
            SessionState::Connected(sdk) => f(sdk),
            SessionState::Disconnected | SessionState::Connecting => {
                Err(BridgeError::NotInitialized)
            }
        }
    }

    /// Closes the session.
    ///
    /// `close` receives the handle and performs the SDK-side shutdown. When
    /// it succeeds the handle is dropped and `release` runs under the state
    /// write lock; when it fails the session stays connected.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotInitialized`] unless connected, or whatever `close`
    /// fails with.
    pub async fn disconnect<F, Fut, R>(&self, close: F, release: R) -> Result<(), BridgeError>
    where
        F: FnOnce(Arc<dyn LiquidSdk>) -> Fut,
        Fut: Future<Output = Result<(), BridgeError>>,
        R: FnOnce(),
    {
        let _transition = self.transition.lock().await;
        let sdk = self.handle()?;
        close(sdk).await?;

        let mut state = self.state.write();
        *state = SessionState::Disconnected;
        release();
        drop(state);
        Ok(())
    }
}
