#![allow(clippy::unwrap_used, dead_code)]
// In-memory OS subsystems for driving the pipeline under virtual time.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::mpsc;

use camlink_core::{
    AccessPointTarget, CallbackId, ConfiguredNetwork, ConnectionInfo, ConnectivitySubsystem,
    NetworkCallbackEvent, NetworkHandle, NetworkId, NetworkRequest, NetworkStateEvent, ObserverId,
    OrchestratorConfig, Orchestrator, OsError, SocketConnector, SupplicantState, WifiConfiguration,
    WifiSubsystem, WirelessProfile,
};

pub const CAMERA_SSID: &str = "Nikon_WU2_0090B5210588";
pub const CAMERA_BSSID: &str = "00:90:b5:21:05:88";
pub const CAMERA_NETWORK: NetworkHandle = NetworkHandle(4711);

pub fn camera_profile() -> WirelessProfile {
    WirelessProfile::open(CAMERA_SSID)
}

pub fn camera_target() -> AccessPointTarget {
    AccessPointTarget::new("192.168.1.1", 15740)
}

pub fn quoted(ssid: &str) -> String {
    format!("\"{ssid}\"")
}

// ── Wireless subsystem ──────────────────────────────────────────────

/// State-mutating calls, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiCall {
    AddNetwork(String),
    Disconnect,
    DisableNetwork(NetworkId),
    EnableNetwork(NetworkId, bool),
    Reconnect,
    RegisterObserver(ObserverId),
    UnregisterObserver(ObserverId),
}

#[derive(Default)]
struct WifiState {
    networks: Vec<ConfiguredNetwork>,
    next_network_id: i32,
    connection: Option<ConnectionInfo>,
    observers: HashMap<u64, mpsc::UnboundedSender<NetworkStateEvent>>,
    next_observer: u64,
    last_enabled: Option<NetworkId>,
    confirm_after: Option<Duration>,
    reject_add: bool,
    lose_added: bool,
    toggles_fail: bool,
    calls: Vec<WifiCall>,
}

#[derive(Clone, Default)]
pub struct FakeWifi {
    state: Arc<Mutex<WifiState>>,
}

impl FakeWifi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network(self, ssid: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = NetworkId(state.next_network_id);
            state.next_network_id += 1;
            state.networks.push(ConfiguredNetwork {
                network_id: id,
                ssid: quoted(ssid),
            });
        }
        self
    }

    /// Report a completed association with `ssid`.
    pub fn associated_with(self, ssid: &str) -> Self {
        self.report_association(ssid);
        self
    }

    pub fn report_association(&self, ssid: &str) {
        self.set_connection(Some(ConnectionInfo {
            ssid: quoted(ssid),
            bssid: Some(CAMERA_BSSID.into()),
            supplicant_state: SupplicantState::Completed,
        }));
    }

    /// Confirm the association `delay` after `reconnect()`.
    pub fn confirming_after(self, delay: Duration) -> Self {
        self.state.lock().unwrap().confirm_after = Some(delay);
        self
    }

    pub fn rejecting_add(self) -> Self {
        self.state.lock().unwrap().reject_add = true;
        self
    }

    /// Accept `add_network` but never list the new profile.
    pub fn losing_added(self) -> Self {
        self.state.lock().unwrap().lose_added = true;
        self
    }

    pub fn failing_toggles(self) -> Self {
        self.state.lock().unwrap().toggles_fail = true;
        self
    }

    pub fn set_connection(&self, connection: Option<ConnectionInfo>) {
        self.state.lock().unwrap().connection = connection;
    }

    /// Deliver `event` to every registered observer.
    pub fn emit(&self, event: NetworkStateEvent) {
        let state = self.state.lock().unwrap();
        for observer in state.observers.values() {
            let _ = observer.send(event);
        }
    }

    pub fn calls(&self) -> Vec<WifiCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&WifiCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn unregister_calls(&self) -> usize {
        self.count(|c| matches!(c, WifiCall::UnregisterObserver(_)))
    }

    pub fn registered_observers(&self) -> usize {
        self.state.lock().unwrap().observers.len()
    }

    pub fn network_id(&self, ssid: &str) -> Option<NetworkId> {
        let quoted = quoted(ssid);
        self.state
            .lock()
            .unwrap()
            .networks
            .iter()
            .find(|n| n.ssid == quoted)
            .map(|n| n.network_id)
    }

    fn record(&self, call: WifiCall) -> bool {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        !state.toggles_fail
    }

    fn complete_association(state: &Mutex<WifiState>) {
        let mut state = state.lock().unwrap();
        let Some(enabled) = state.last_enabled else {
            return;
        };
        let Some(ssid) = state
            .networks
            .iter()
            .find(|n| n.network_id == enabled)
            .map(|n| n.ssid.clone())
        else {
            return;
        };
        state.connection = Some(ConnectionInfo {
            ssid,
            bssid: Some(CAMERA_BSSID.into()),
            supplicant_state: SupplicantState::Completed,
        });
        for observer in state.observers.values() {
            let _ = observer.send(NetworkStateEvent::connected());
        }
    }
}

impl WifiSubsystem for FakeWifi {
    fn configured_networks(&self) -> Vec<ConfiguredNetwork> {
        self.state.lock().unwrap().networks.clone()
    }

    fn add_network(&self, config: &WifiConfiguration) -> Option<NetworkId> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(WifiCall::AddNetwork(config.ssid.clone()));
        if state.reject_add {
            return None;
        }
        let id = NetworkId(state.next_network_id);
        state.next_network_id += 1;
        if !state.lose_added {
            state.networks.push(ConfiguredNetwork {
                network_id: id,
                ssid: config.ssid.clone(),
            });
        }
        Some(id)
    }

    fn connection_info(&self) -> Option<ConnectionInfo> {
        self.state.lock().unwrap().connection.clone()
    }

    fn disconnect(&self) -> bool {
        let ok = self.record(WifiCall::Disconnect);
        if ok {
            self.state.lock().unwrap().connection = None;
        }
        ok
    }

    fn disable_network(&self, id: NetworkId) -> bool {
        self.record(WifiCall::DisableNetwork(id))
    }

    fn enable_network(&self, id: NetworkId, disable_others: bool) -> bool {
        let ok = self.record(WifiCall::EnableNetwork(id, disable_others));
        if ok {
            self.state.lock().unwrap().last_enabled = Some(id);
        }
        ok
    }

    fn reconnect(&self) -> bool {
        let ok = self.record(WifiCall::Reconnect);
        let confirm_after = self.state.lock().unwrap().confirm_after;
        if let (true, Some(delay)) = (ok, confirm_after) {
            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                Self::complete_association(&state);
            });
        }
        ok
    }

    fn register_state_observer(
        &self,
    ) -> Result<(ObserverId, mpsc::UnboundedReceiver<NetworkStateEvent>), OsError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().unwrap();
        let id = state.next_observer;
        state.next_observer += 1;
        state.observers.insert(id, tx);
        state.calls.push(WifiCall::RegisterObserver(ObserverId(id)));
        Ok((ObserverId(id), rx))
    }

    fn unregister_state_observer(&self, id: ObserverId) -> Result<(), OsError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(WifiCall::UnregisterObserver(id));
        state
            .observers
            .remove(&id.0)
            .map(|_| ())
            .ok_or(OsError::NotRegistered)
    }
}

// ── Connectivity subsystem ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityCall {
    RequestNetwork(CallbackId),
    UnregisterCallback(CallbackId),
    Bind(Option<NetworkHandle>),
}

#[derive(Default)]
struct ConnectivityState {
    callbacks: HashMap<u64, mpsc::UnboundedSender<NetworkCallbackEvent>>,
    next_callback: u64,
    available_after: Option<Duration>,
    bound: Option<NetworkHandle>,
    bind_fails: bool,
    calls: Vec<ConnectivityCall>,
}

#[derive(Clone, Default)]
pub struct FakeConnectivity {
    state: Arc<Mutex<ConnectivityState>>,
}

impl FakeConnectivity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report [`CAMERA_NETWORK`] available `delay` after each request.
    pub fn available_after(self, delay: Duration) -> Self {
        self.state.lock().unwrap().available_after = Some(delay);
        self
    }

    /// Refuse every `bind_process_to_network` call.
    pub fn failing_bind(self) -> Self {
        self.state.lock().unwrap().bind_fails = true;
        self
    }

    pub fn bound_to(self, network: NetworkHandle) -> Self {
        self.state.lock().unwrap().bound = Some(network);
        self
    }

    pub fn bound(&self) -> Option<NetworkHandle> {
        self.state.lock().unwrap().bound
    }

    pub fn calls(&self) -> Vec<ConnectivityCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn unregister_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ConnectivityCall::UnregisterCallback(_)))
            .count()
    }

    pub fn registered_callbacks(&self) -> usize {
        self.state.lock().unwrap().callbacks.len()
    }
}

impl ConnectivitySubsystem for FakeConnectivity {
    fn request_network(
        &self,
        _request: &NetworkRequest,
    ) -> Result<(CallbackId, mpsc::UnboundedReceiver<NetworkCallbackEvent>), OsError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().unwrap();
        let id = state.next_callback;
        state.next_callback += 1;
        state.callbacks.insert(id, tx);
        state.calls.push(ConnectivityCall::RequestNetwork(CallbackId(id)));

        if let Some(delay) = state.available_after {
            let shared = Arc::clone(&self.state);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let state = shared.lock().unwrap();
                if let Some(callback) = state.callbacks.get(&id) {
                    let _ = callback.send(NetworkCallbackEvent::Available(CAMERA_NETWORK));
                }
            });
        }
        Ok((CallbackId(id), rx))
    }

    fn unregister_network_callback(&self, id: CallbackId) -> Result<(), OsError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ConnectivityCall::UnregisterCallback(id));
        state
            .callbacks
            .remove(&id.0)
            .map(|_| ())
            .ok_or(OsError::NotRegistered)
    }

    fn bind_process_to_network(&self, network: Option<NetworkHandle>) -> bool {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ConnectivityCall::Bind(network));
        if state.bind_fails {
            return false;
        }
        state.bound = network;
        true
    }
}

// ── Socket connector ────────────────────────────────────────────────

/// Refuses connections until attempt `succeed_on`; each attempt takes
/// `latency` of virtual time.
#[derive(Clone)]
pub struct FakeConnector {
    succeed_on: Option<u32>,
    latency: Duration,
    calls: Arc<Mutex<u32>>,
}

impl FakeConnector {
    pub fn succeeding_on(attempt: u32) -> Self {
        Self {
            succeed_on: Some(attempt),
            latency: Duration::from_millis(100),
            calls: Arc::default(),
        }
    }

    pub fn never() -> Self {
        Self {
            succeed_on: None,
            latency: Duration::from_millis(100),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

impl SocketConnector for FakeConnector {
    fn connect<'a>(
        &'a self,
        _target: &'a AccessPointTarget,
        _timeout: Duration,
    ) -> BoxFuture<'a, io::Result<()>> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        Box::pin(async move {
            tokio::time::sleep(self.latency).await;
            if self.succeed_on.is_some_and(|n| call >= n) {
                Ok(())
            } else {
                Err(io::Error::from(io::ErrorKind::ConnectionRefused))
            }
        })
    }
}

// ── Wiring ──────────────────────────────────────────────────────────

pub fn orchestrator(
    wifi: &FakeWifi,
    connectivity: &FakeConnectivity,
    connector: &FakeConnector,
) -> Orchestrator {
    Orchestrator::new(
        Arc::new(wifi.clone()),
        Arc::new(connectivity.clone()),
        Arc::new(connector.clone()),
        OrchestratorConfig::default(),
    )
}
