// ── Access-point association ──
//
// Makes sure the camera profile exists, steers the OS onto it, and waits
// for the network-state notification confirming the association.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{ConfiguredNetwork, WirelessProfile};
use crate::os::{OsError, WifiSubsystem};
use crate::subscription::Subscription;

/// How [`Associator::associate`] reached the target network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    /// The device was already associated with the profile; nothing was
    /// toggled and no observer was registered.
    AlreadyAssociated,
    /// The OS confirmed the association via a state notification.
    Confirmed,
}

/// First pipeline stage: join the camera's access point.
pub struct Associator {
    wifi: Arc<dyn WifiSubsystem>,
}

impl Associator {
    pub fn new(wifi: Arc<dyn WifiSubsystem>) -> Self {
        Self { wifi }
    }

    /// Associate with `profile`, creating its OS profile if needed.
    ///
    /// Toggle calls the OS declines are pushed onto `warnings` and do not
    /// abort; if they mattered, the confirmation never arrives and the
    /// caller's timeout fires. Pending until confirmed: drop the future to
    /// cancel, which unregisters the observer.
    pub async fn associate(
        &self,
        profile: &WirelessProfile,
        warnings: &mut Vec<String>,
    ) -> Result<Association, CoreError> {
        let config = profile.wifi_configuration();
        let ssid = config.ssid.as_str();

        log_configured_networks(self.wifi.as_ref(), "before lookup");

        let network = if let Some(network) = self.find(ssid) {
            network
        } else {
            info!(%ssid, "network profile does not exist yet, adding it");
            let Some(id) = self.wifi.add_network(&config) else {
                return Err(CoreError::ProfileCreation {
                    ssid: profile.ssid().into(),
                });
            };
            debug!(network_id = id.0, "network profile added");
            log_configured_networks(self.wifi.as_ref(), "after add");

            self.find(ssid).ok_or_else(|| CoreError::ProfileMissing {
                ssid: profile.ssid().into(),
            })?
        };
        debug!(%ssid, network_id = network.network_id.0, "found network profile");

        if self
            .wifi
            .connection_info()
            .is_some_and(|conn| conn.is_associated_with(ssid))
        {
            info!(%ssid, "already associated");
            return Ok(Association::AlreadyAssociated);
        }

        self.switch_to(&network, warnings);

        // Registering only now keeps teardown events of the previous
        // network out of the stream.
        let (observer, mut events) = self
            .wifi
            .register_state_observer()
            .map_err(|e| CoreError::os("register network state observer", e))?;
        let wifi = Arc::clone(&self.wifi);
        let subscription = Subscription::new("network-state-observer", move || {
            wifi.unregister_state_observer(observer)
        });

        while let Some(event) = events.recv().await {
            debug!(state = %event.state, detailed = %event.detailed_state, "network state changed");
            if !event.is_connected() {
                continue;
            }
            let current = self.wifi.connection_info();
            if current.as_ref().is_some_and(|conn| conn.ssid == ssid) {
                subscription.release();
                info!(%ssid, "association confirmed");
                return Ok(Association::Confirmed);
            }
            debug!(
                current = current.as_ref().map(|c| c.ssid.as_str()),
                "connected, but not to the camera network"
            );
        }

        Err(CoreError::os(
            "network state observer",
            OsError::Unavailable("notification stream closed".into()),
        ))
    }

    fn find(&self, ssid: &str) -> Option<ConfiguredNetwork> {
        self.wifi
            .configured_networks()
            .into_iter()
            .find(|network| network.ssid == ssid)
    }

    /// Drop the current association, disable every competing profile so
    /// the OS cannot roam away opportunistically, then enable the target.
    fn switch_to(&self, target: &ConfiguredNetwork, warnings: &mut Vec<String>) {
        info!(ssid = %target.ssid, "disconnecting before switching to camera network");
        if !self.wifi.disconnect() {
            note(warnings, "disconnect from current network failed".into());
        }

        for other in self
            .wifi
            .configured_networks()
            .iter()
            .filter(|network| network.ssid != target.ssid)
        {
            if self.wifi.disable_network(other.network_id) {
                debug!(ssid = %other.ssid, "disabled competing network");
            } else {
                note(warnings, format!("disable {} failed", other.ssid));
            }
        }

        if !self.wifi.enable_network(target.network_id, true) {
            note(warnings, format!("enable {} failed", target.ssid));
        }
        if !self.wifi.reconnect() {
            note(warnings, "reconnect failed".into());
        }
    }
}

fn note(warnings: &mut Vec<String>, message: String) {
    warn!("{message}");
    warnings.push(message);
}

pub(crate) fn log_configured_networks(wifi: &dyn WifiSubsystem, when: &str) {
    for network in wifi.configured_networks() {
        debug!(when, ssid = %network.ssid, network_id = network.network_id.0, "configured network");
    }
}
