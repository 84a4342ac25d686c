// ── Session: state-controller core ──
//
// Owns the visible ConnectionState and the cancellation handle of the
// active attempt. State changes are published on a watch channel; a
// renderer subscribes and draws, it never writes state itself.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{AccessPointTarget, ConnectionState, WirelessProfile};
use crate::orchestrator::Orchestrator;

/// Drives an [`Orchestrator`] for one camera and publishes
/// [`ConnectionState`] transitions.
///
/// Cheaply cloneable. Allows at most one connection attempt at a time.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    orchestrator: Orchestrator,
    profile: WirelessProfile,
    target: AccessPointTarget,
    state: watch::Sender<ConnectionState>,
    /// Token of the attempt in flight, if any.
    cancel: Mutex<Option<CancellationToken>>,
}

impl Session {
    pub fn new(
        orchestrator: Orchestrator,
        profile: WirelessProfile,
        target: AccessPointTarget,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(SessionInner {
                orchestrator,
                profile,
                target,
                state,
                cancel: Mutex::new(None),
            }),
        }
    }

    pub fn profile(&self) -> &WirelessProfile {
        &self.inner.profile
    }

    pub fn target(&self) -> &AccessPointTarget {
        &self.inner.target
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.inner.orchestrator
    }

    // ── State observation ────────────────────────────────────────────

    pub fn current_state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// State transitions as a `Stream`, starting with the current state.
    pub fn state_stream(&self) -> WatchStream<ConnectionState> {
        WatchStream::new(self.state())
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run a full connect. Moves to `Connecting`, then to `Connected` on
    /// success or back to `Disconnected` on any failure.
    ///
    /// Fails with [`CoreError::AttemptInProgress`] while another attempt
    /// runs, and with [`CoreError::AlreadyConnected`] once connected.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let token = {
            let mut slot = self.inner.cancel.lock().await;
            let mut refused = None;
            self.inner.state.send_if_modified(|state| match *state {
                ConnectionState::Disconnected => {
                    *state = ConnectionState::Connecting;
                    true
                }
                ConnectionState::Connecting => {
                    refused = Some(CoreError::AttemptInProgress);
                    false
                }
                ConnectionState::Connected => {
                    refused = Some(CoreError::AlreadyConnected);
                    false
                }
            });
            if let Some(err) = refused {
                return Err(err);
            }
            // Replaces any token a dropped attempt could not clear.
            let token = CancellationToken::new();
            *slot = Some(token.clone());
            token
        };

        // Resets to Disconnected if this future is dropped mid-attempt.
        let guard = AttemptGuard {
            inner: &self.inner,
            armed: true,
        };

        let inner = &self.inner;
        let result = inner
            .orchestrator
            .connect(&inner.profile, &inner.target, &token)
            .await;
        inner.cancel.lock().await.take();

        let next = if result.is_ok() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };
        guard.settle(next);
        result
    }

    /// Cancel the attempt in flight. Returns `false` if there was none.
    pub async fn cancel(&self) -> bool {
        let slot = self.inner.cancel.lock().await;
        match slot.as_ref() {
            Some(token) if self.current_state() == ConnectionState::Connecting => {
                info!("cancelling connection attempt");
                token.cancel();
                true
            }
            _ => {
                debug!("no connection attempt to cancel");
                false
            }
        }
    }

    /// Tear the connection down. Moves to `Disconnected` on success; on
    /// failure the state is left as it was.
    pub fn disconnect(&self) -> Result<(), CoreError> {
        self.inner.orchestrator.disconnect(&self.inner.profile)?;
        self.inner.state.send_replace(ConnectionState::Disconnected);
        Ok(())
    }
}

/// Publishes the final state of an attempt. If the attempt is dropped
/// before it settles, forgets its token and falls back to `Disconnected`.
struct AttemptGuard<'a> {
    inner: &'a SessionInner,
    armed: bool,
}

impl AttemptGuard<'_> {
    fn settle(mut self, next: ConnectionState) {
        self.armed = false;
        self.inner.state.send_replace(next);
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut slot) = self.inner.cancel.try_lock() {
            slot.take();
        }
        self.inner.state.send_replace(ConnectionState::Disconnected);
    }
}
