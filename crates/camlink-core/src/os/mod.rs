// ── OS collaborator seams ──
//
// The wireless subsystem, the connectivity subsystem, and raw socket I/O
// are external collaborators. Their calls are synchronous; notifications
// arrive asynchronously over `mpsc` channels handed out at registration.
// Platform backends (and the test fakes) implement these traits.

mod tcp;

use std::io;
use std::time::Duration;

use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::model::{
    AccessPointTarget, CallbackId, ConfiguredNetwork, ConnectionInfo, NetworkCallbackEvent,
    NetworkHandle, NetworkId, NetworkRequest, NetworkStateEvent, ObserverId, WifiConfiguration,
};

pub use tcp::TcpConnector;

/// Errors reported by an OS collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OsError {
    /// Unregistering something that is not (or no longer) registered.
    #[error("not registered")]
    NotRegistered,

    #[error("rejected by the OS: {0}")]
    Rejected(String),

    #[error("subsystem unavailable: {0}")]
    Unavailable(String),
}

/// Wireless subsystem: saved profiles, current association, and
/// network-state-changed notifications.
///
/// Boolean returns mirror the platform: `false` means the OS declined the
/// request, which callers treat as a warning rather than an error.
pub trait WifiSubsystem: Send + Sync {
    /// All saved wireless profiles.
    fn configured_networks(&self) -> Vec<ConfiguredNetwork>;

    /// Save a new profile. `None` means the OS rejected it.
    fn add_network(&self, config: &WifiConfiguration) -> Option<NetworkId>;

    /// Current association, if the subsystem reports one.
    fn connection_info(&self) -> Option<ConnectionInfo>;

    fn disconnect(&self) -> bool;

    fn disable_network(&self, id: NetworkId) -> bool;

    /// Enable a saved profile; `disable_others` asks the OS to prefer it
    /// exclusively.
    fn enable_network(&self, id: NetworkId, disable_others: bool) -> bool;

    fn reconnect(&self) -> bool;

    /// Start receiving network-state-changed notifications.
    fn register_state_observer(
        &self,
    ) -> Result<(ObserverId, mpsc::UnboundedReceiver<NetworkStateEvent>), OsError>;

    /// Stop a previously registered observer. Returns
    /// [`OsError::NotRegistered`] for unknown ids.
    fn unregister_state_observer(&self, id: ObserverId) -> Result<(), OsError>;
}

/// Connectivity subsystem: network requests and the process-wide route
/// binding.
pub trait ConnectivitySubsystem: Send + Sync {
    /// Request a network matching `request`; callbacks keep arriving on
    /// the returned receiver until the callback is unregistered.
    fn request_network(
        &self,
        request: &NetworkRequest,
    ) -> Result<(CallbackId, mpsc::UnboundedReceiver<NetworkCallbackEvent>), OsError>;

    fn unregister_network_callback(&self, id: CallbackId) -> Result<(), OsError>;

    /// Pin the process's default route to `network`, or clear the pin
    /// with `None`.
    fn bind_process_to_network(&self, network: Option<NetworkHandle>) -> bool;
}

/// Raw socket I/O used to verify the control socket.
pub trait SocketConnector: Send + Sync {
    /// Open a TCP connection to `target` within `timeout` and close it
    /// again straight away.
    fn connect<'a>(
        &'a self,
        target: &'a AccessPointTarget,
        timeout: Duration,
    ) -> BoxFuture<'a, io::Result<()>>;
}
