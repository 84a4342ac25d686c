// ── Connection orchestration ──
//
// Sequences Associator → Binder → Prober as one cancellable pipeline
// under a single overall timeout, and undoes it again on disconnect.
// Only the stage currently awaited holds an OS registration, so
// dropping the pipeline cleans up exactly that stage.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::associator::{Association, Associator, log_configured_networks};
use crate::binder::Binder;
use crate::config::OrchestratorConfig;
use crate::error::CoreError;
use crate::model::{AccessPointTarget, Stage, WirelessProfile};
use crate::os::{ConnectivitySubsystem, SocketConnector, WifiSubsystem};
use crate::prober::Prober;

/// Bookkeeping for one in-flight connect.
#[derive(Debug)]
struct ConnectionAttempt {
    id: Uuid,
    stage: Option<Stage>,
    /// Non-fatal failures, reported if the attempt later times out.
    warnings: Vec<String>,
    probe_attempts: u32,
}

impl ConnectionAttempt {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: None,
            warnings: Vec::new(),
            probe_attempts: 0,
        }
    }
}

/// How the pipeline future finished.
enum Outcome {
    Finished(Result<(), CoreError>),
    TimedOut,
    Cancelled,
}

/// Connect/disconnect workflow against the camera's access point.
///
/// Does not serialize concurrent `connect()` calls; the caller (see
/// [`Session`](crate::Session)) keeps at most one attempt in flight.
pub struct Orchestrator {
    wifi: Arc<dyn WifiSubsystem>,
    connectivity: Arc<dyn ConnectivitySubsystem>,
    associator: Associator,
    binder: Binder,
    prober: Prober,
    config: OrchestratorConfig,
    stage: watch::Sender<Option<Stage>>,
}

impl Orchestrator {
    pub fn new(
        wifi: Arc<dyn WifiSubsystem>,
        connectivity: Arc<dyn ConnectivitySubsystem>,
        connector: Arc<dyn SocketConnector>,
        config: OrchestratorConfig,
    ) -> Self {
        let (stage, _) = watch::channel(None);
        Self {
            associator: Associator::new(Arc::clone(&wifi)),
            binder: Binder::new(Arc::clone(&connectivity)),
            prober: Prober::new(connector, config.probe.clone()),
            wifi,
            connectivity,
            config,
            stage,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Subscribe to the stage of the running attempt (`None` when idle).
    pub fn stage(&self) -> watch::Receiver<Option<Stage>> {
        self.stage.subscribe()
    }

    // ── Connect ──────────────────────────────────────────────────────

    /// Associate with `profile`, bind the process to it, and wait until
    /// `target` accepts a TCP connection.
    ///
    /// Fails on the first stage error, when the overall timeout elapses
    /// (with an error naming the stage that was running), or with
    /// [`CoreError::Cancelled`] once `cancel` fires. Dropping the future
    /// cancels just the same.
    pub async fn connect(
        &self,
        profile: &WirelessProfile,
        target: &AccessPointTarget,
        cancel: &CancellationToken,
    ) -> Result<(), CoreError> {
        let mut attempt = ConnectionAttempt::new();
        info!(attempt = %attempt.id, ssid = profile.ssid(), %target, "connecting to camera");

        let outcome = {
            let pipeline = self.run_pipeline(profile, target, &mut attempt);
            tokio::select! {
                biased;
                () = cancel.cancelled() => Outcome::Cancelled,
                result = tokio::time::timeout(self.config.connect_timeout, pipeline) => {
                    result.map_or(Outcome::TimedOut, Outcome::Finished)
                }
            }
        };
        self.stage.send_replace(None);

        let result = match outcome {
            Outcome::Finished(result) => result.map_err(|e| e.with_warnings(attempt.warnings)),
            Outcome::TimedOut => Err(self.timeout_error(profile, target, attempt)),
            Outcome::Cancelled => Err(CoreError::Cancelled),
        };

        match &result {
            Ok(()) => info!(ssid = profile.ssid(), %target, "connected to camera"),
            Err(e) => warn!(ssid = profile.ssid(), error = %e, "connection attempt failed"),
        }
        result
    }

    async fn run_pipeline(
        &self,
        profile: &WirelessProfile,
        target: &AccessPointTarget,
        attempt: &mut ConnectionAttempt,
    ) -> Result<(), CoreError> {
        self.enter(attempt, Stage::Associate);
        let association = self
            .associator
            .associate(profile, &mut attempt.warnings)
            .await?;
        debug!(?association, "association stage complete");
        if association == Association::AlreadyAssociated {
            debug!("skipped profile toggling, already on the camera network");
        }

        self.enter(attempt, Stage::Bind);
        self.binder.bind(&mut attempt.warnings).await?;

        self.enter(attempt, Stage::Probe);
        self.prober.probe(target, &mut attempt.probe_attempts).await
    }

    fn enter(&self, attempt: &mut ConnectionAttempt, stage: Stage) {
        debug!(attempt = %attempt.id, %stage, "entering stage");
        attempt.stage = Some(stage);
        self.stage.send_replace(Some(stage));
    }

    fn timeout_error(
        &self,
        profile: &WirelessProfile,
        target: &AccessPointTarget,
        attempt: ConnectionAttempt,
    ) -> CoreError {
        let timeout_secs = self.config.connect_timeout.as_secs();
        let error = match attempt.stage {
            None | Some(Stage::Associate) => CoreError::AssociationTimeout {
                ssid: profile.ssid().into(),
                timeout_secs,
                warnings: Vec::new(),
            },
            Some(Stage::Bind) => CoreError::BindTimeout {
                timeout_secs,
                warnings: Vec::new(),
            },
            Some(Stage::Probe) => CoreError::SocketUnreachable {
                target: target.to_string(),
                attempts: attempt.probe_attempts,
                warnings: Vec::new(),
            },
        };
        error.with_warnings(attempt.warnings)
    }

    // ── Disconnect ───────────────────────────────────────────────────

    /// Release the route binding, drop the association, and disable the
    /// camera profile.
    ///
    /// Fails with [`CoreError::NotConnected`] without touching anything
    /// if the OS does not report a completed association with `profile`.
    pub fn disconnect(&self, profile: &WirelessProfile) -> Result<(), CoreError> {
        let ssid = profile.quoted_ssid();
        log_configured_networks(self.wifi.as_ref(), "before disconnect");

        let associated = self
            .wifi
            .connection_info()
            .is_some_and(|conn| conn.is_completed_on(&ssid));
        if !associated {
            return Err(CoreError::NotConnected {
                ssid: profile.ssid().into(),
            });
        }

        if !self.connectivity.bind_process_to_network(None) {
            warn!("clearing the process network binding failed");
        }

        info!(%ssid, "disconnecting from camera network");
        if !self.wifi.disconnect() {
            warn!(%ssid, "disconnect failed");
        }

        match self
            .wifi
            .configured_networks()
            .into_iter()
            .find(|network| network.ssid == ssid)
        {
            Some(network) => {
                if self.wifi.disable_network(network.network_id) {
                    debug!(%ssid, "camera network disabled");
                } else {
                    warn!(%ssid, "disabling camera network failed");
                }
            }
            None => debug!(%ssid, "camera network profile not found, nothing to disable"),
        }

        info!(%ssid, "disconnected from camera network");
        Ok(())
    }
}
