// ── Process network binding ──
//
// With cellular data (or ethernet) up next to the camera's access point,
// the OS may route the control socket over the wrong interface. This
// stage requests a wireless-transport network and pins the process's
// default route to it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{NetworkCallbackEvent, NetworkHandle, NetworkRequest};
use crate::os::{ConnectivitySubsystem, OsError};
use crate::subscription::Subscription;

/// Second pipeline stage: bind the process to the wireless network.
pub struct Binder {
    connectivity: Arc<dyn ConnectivitySubsystem>,
}

impl Binder {
    pub fn new(connectivity: Arc<dyn ConnectivitySubsystem>) -> Self {
        Self { connectivity }
    }

    /// Wait for a wireless network to become available and bind to it.
    ///
    /// The network callback is one-shot: it is unregistered as soon as
    /// the binding is in place, or when the future is dropped first.
    pub async fn bind(&self, warnings: &mut Vec<String>) -> Result<NetworkHandle, CoreError> {
        let (callback, mut events) = self
            .connectivity
            .request_network(&NetworkRequest::wifi())
            .map_err(|e| CoreError::os("request wireless network", e))?;
        let connectivity = Arc::clone(&self.connectivity);
        let subscription = Subscription::new("network-callback", move || {
            connectivity.unregister_network_callback(callback)
        });

        while let Some(event) = events.recv().await {
            match event {
                NetworkCallbackEvent::Available(network) => {
                    if !self.connectivity.bind_process_to_network(Some(network)) {
                        let message = format!("binding process to network {} failed", network.0);
                        warn!("{message}");
                        warnings.push(message);
                    }
                    subscription.release();
                    info!(network = network.0, "process bound to wireless network");
                    return Ok(network);
                }
                NetworkCallbackEvent::Unavailable => debug!("no wireless network available yet"),
                NetworkCallbackEvent::Lost(network) => {
                    debug!(network = network.0, "wireless network lost while waiting");
                }
            }
        }

        Err(CoreError::os(
            "network callback",
            OsError::Unavailable("callback stream closed".into()),
        ))
    }
}
