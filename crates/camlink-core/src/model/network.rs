// ── OS-reported network types ──
//
// Values exchanged with the OS wireless and connectivity subsystems.
// SSIDs in these types are always in the OS's double-quoted form.

use strum::Display;

/// OS identifier of a configured wireless profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkId(pub i32);

/// A wireless profile saved in the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredNetwork {
    pub network_id: NetworkId,
    pub ssid: String,
}

/// Phase of the wireless authentication handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SupplicantState {
    Disconnected,
    Inactive,
    Scanning,
    Authenticating,
    Associating,
    Associated,
    FourWayHandshake,
    GroupHandshake,
    Completed,
    Dormant,
    Unknown,
}

/// Current association as reported by the wireless subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub ssid: String,
    /// Link-layer address of the access point, absent while unassociated.
    pub bssid: Option<String>,
    pub supplicant_state: SupplicantState,
}

impl ConnectionInfo {
    /// Handshake completed on `ssid`.
    pub fn is_completed_on(&self, ssid: &str) -> bool {
        self.supplicant_state == SupplicantState::Completed && self.ssid == ssid
    }

    /// Handshake completed on `ssid` with a known access point address.
    pub fn is_associated_with(&self, ssid: &str) -> bool {
        self.is_completed_on(ssid) && self.bssid.is_some()
    }
}

/// Coarse network state carried by a state-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NetworkState {
    Connecting,
    Connected,
    Suspended,
    Disconnecting,
    Disconnected,
    Unknown,
}

/// Fine-grained network state carried by a state-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DetailedState {
    Idle,
    Scanning,
    Connecting,
    Authenticating,
    ObtainingIpAddr,
    Connected,
    Suspended,
    Disconnecting,
    Disconnected,
    Failed,
    Blocked,
    VerifyingPoorLink,
    CaptivePortalCheck,
}

/// Payload of a network-state-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkStateEvent {
    pub state: NetworkState,
    pub detailed_state: DetailedState,
}

impl NetworkStateEvent {
    pub fn new(state: NetworkState, detailed_state: DetailedState) -> Self {
        Self {
            state,
            detailed_state,
        }
    }

    pub fn connected() -> Self {
        Self::new(NetworkState::Connected, DetailedState::Connected)
    }

    /// Both the coarse and the detailed state report a finished connection.
    pub fn is_connected(&self) -> bool {
        self.state == NetworkState::Connected && self.detailed_state == DetailedState::Connected
    }
}

/// Handle to a network granted by the connectivity subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TransportType {
    Wifi,
    Cellular,
    Ethernet,
}

/// Capability filter for a network request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRequest {
    pub transports: Vec<TransportType>,
}

impl NetworkRequest {
    /// Any network carried over a wireless transport.
    pub fn wifi() -> Self {
        Self {
            transports: vec![TransportType::Wifi],
        }
    }
}

/// Callback delivered for an outstanding [`NetworkRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkCallbackEvent {
    Available(NetworkHandle),
    Unavailable,
    Lost(NetworkHandle),
}

/// Registration handle for a network-state observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// Registration handle for a network request callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub u64);
