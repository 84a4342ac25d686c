// ── Domain model ──
//
// Static configuration (profile, target), values exchanged with the OS
// subsystems, and the lifecycle states consumers observe.

pub mod network;
pub mod profile;
pub mod state;

// ── Re-exports ──────────────────────────────────────────────────────

pub use network::{
    CallbackId, ConfiguredNetwork, ConnectionInfo, DetailedState, NetworkCallbackEvent,
    NetworkHandle, NetworkId, NetworkRequest, NetworkState, NetworkStateEvent, ObserverId,
    SupplicantState, TransportType,
};
pub use profile::{
    AccessPointTarget, DEFAULT_PRIORITY, KeyManagement, WifiConfiguration, WirelessProfile,
};
pub use state::{ConnectionState, Stage};
