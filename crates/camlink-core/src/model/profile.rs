// ── Wireless profile & access point target ──
//
// Static configuration describing which access point to join and which
// control socket to verify once joined. Built once at startup, never
// mutated afterwards.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Priority handed to the OS for the camera profile. High enough to win
/// over any profile the user saved by hand.
pub const DEFAULT_PRIORITY: i32 = 100_000;

/// Identifies the camera's access point.
///
/// A blank key (empty or whitespace only) is normalised away on
/// construction, so a profile is either open or pre-shared-key secured.
#[derive(Debug, Clone)]
pub struct WirelessProfile {
    ssid: String,
    key: Option<SecretString>,
    priority: i32,
}

impl WirelessProfile {
    pub fn new(ssid: impl Into<String>, key: Option<SecretString>) -> Self {
        let key = key.filter(|k| !k.expose_secret().trim().is_empty());
        Self {
            ssid: ssid.into(),
            key,
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Profile for an unsecured access point.
    pub fn open(ssid: impl Into<String>) -> Self {
        Self::new(ssid, None)
    }

    /// Profile secured with a pre-shared key. A blank key yields an open
    /// profile.
    pub fn with_key(ssid: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(ssid, Some(SecretString::from(key.into())))
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// The bare network name, as the user would type it.
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_open(&self) -> bool {
        self.key.is_none()
    }

    /// The SSID in the double-quoted form the OS uses when it reports
    /// configured networks and the current association.
    pub fn quoted_ssid(&self) -> String {
        quote(&self.ssid)
    }

    /// Derive the OS-facing configuration for this profile.
    pub fn wifi_configuration(&self) -> WifiConfiguration {
        let key_management = match &self.key {
            None => KeyManagement::Open,
            Some(key) => {
                KeyManagement::PreSharedKey(SecretString::from(quote(key.expose_secret())))
            }
        };

        WifiConfiguration {
            ssid: self.quoted_ssid(),
            priority: self.priority,
            key_management,
        }
    }
}

/// Authentication scheme of a [`WifiConfiguration`].
#[derive(Debug, Clone)]
pub enum KeyManagement {
    /// No key management: open network.
    Open,
    /// WPA pre-shared key, already wrapped in double quotes.
    PreSharedKey(SecretString),
}

impl KeyManagement {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// A network profile in the shape the OS wireless subsystem accepts.
#[derive(Debug, Clone)]
pub struct WifiConfiguration {
    /// Quoted SSID.
    pub ssid: String,
    pub priority: i32,
    pub key_management: KeyManagement,
}

/// The camera's control socket endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessPointTarget {
    pub host: String,
    pub port: u16,
}

impl AccessPointTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for AccessPointTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

fn quote(value: &str) -> String {
    format!("\"{value}\"")
}
