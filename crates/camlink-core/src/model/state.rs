// ── Connection lifecycle states ──

use strum::Display;

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Pipeline stage of a running connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    /// Joining the camera's access point.
    Associate,
    /// Pinning the process route to the joined network.
    Bind,
    /// Waiting for the control socket to accept connections.
    Probe,
}
