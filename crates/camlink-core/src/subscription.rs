// ── Scoped OS subscriptions ──
//
// Observers and network callbacks are acquired on stage entry and
// released when the guard goes away: explicit release on success, drop
// on failure, timeout, or cancellation (a dropped future drops its
// guards). Either way the release closure runs exactly once.

use std::fmt;

use tracing::{debug, warn};

use crate::os::OsError;

type Release = Box<dyn FnOnce() -> Result<(), OsError> + Send>;

/// Guard owning one OS registration.
pub struct Subscription {
    label: &'static str,
    release: Option<Release>,
}

impl Subscription {
    /// Wrap a registration; `release` undoes it.
    pub fn new(
        label: &'static str,
        release: impl FnOnce() -> Result<(), OsError> + Send + 'static,
    ) -> Self {
        debug!(label, "subscription acquired");
        Self {
            label,
            release: Some(Box::new(release)),
        }
    }

    /// Release now instead of at end of scope.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        let Some(release) = self.release.take() else {
            return;
        };
        match release() {
            Ok(()) => debug!(label = self.label, "subscription released"),
            // Already gone on the OS side: cleanup is idempotent.
            Err(OsError::NotRegistered) => {
                debug!(label = self.label, "subscription was not registered, ignoring");
            }
            Err(e) => warn!(label = self.label, error = %e, "failed to release subscription"),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.label)
            .field("active", &self.release.is_some())
            .finish()
    }
}
