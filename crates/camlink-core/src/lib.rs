//! Connect a host to a peer-to-peer camera's wireless access point.
//!
//! The workflow is a three-stage asynchronous pipeline:
//!
//! - **[`Associator`]**: makes sure the camera profile exists, switches
//!   the OS over to it, and waits for the OS to confirm the association.
//!
//! - **[`Binder`]**: requests a wireless-transport network and pins the
//!   process's default route to it, so control traffic cannot leak over
//!   cellular or ethernet.
//!
//! - **[`Prober`]**: retries short TCP connects against the camera's
//!   control socket until one succeeds.
//!
//! The **[`Orchestrator`]** runs the stages in strict sequence under one
//! overall timeout; cancelling (or dropping) a connect cleans up exactly
//! the stage in flight through its [`Subscription`] guard.
//! **[`Session`]** sits on top, owns the visible [`ConnectionState`], and
//! publishes transitions on a `watch` channel for whatever renders them.
//!
//! The OS is reached only through the traits in [`os`].

pub mod associator;
pub mod binder;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod os;
pub mod prober;
pub mod session;
pub mod subscription;

// ── Primary re-exports ──────────────────────────────────────────────
pub use associator::{Association, Associator};
pub use binder::Binder;
pub use config::OrchestratorConfig;
pub use error::CoreError;
pub use orchestrator::Orchestrator;
pub use os::{ConnectivitySubsystem, OsError, SocketConnector, TcpConnector, WifiSubsystem};
pub use prober::{ProbeAttempt, ProbePolicy, Prober, probe_attempts};
pub use session::Session;
pub use subscription::Subscription;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AccessPointTarget, CallbackId, ConfiguredNetwork, ConnectionInfo, ConnectionState,
    DetailedState, KeyManagement, NetworkCallbackEvent, NetworkHandle, NetworkId, NetworkRequest,
    NetworkState, NetworkStateEvent, ObserverId, Stage, SupplicantState, TransportType,
    WifiConfiguration, WirelessProfile,
};
