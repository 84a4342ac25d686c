//! Configuration for camlink.
//!
//! One TOML file describing the camera (SSID, pre-shared key, control
//! socket) plus timeouts, layered under `CAMLINK_` environment overrides.
//! Translates into the runtime types of `camlink_core`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use camlink_core::{AccessPointTarget, OrchestratorConfig, ProbePolicy, WirelessProfile};

const KEYRING_SERVICE: &str = "camlink";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraSection,

    #[serde(default)]
    pub timeouts: TimeoutSection,
}

/// The camera's access point and control socket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CameraSection {
    /// Network name, unquoted.
    #[serde(default = "default_ssid")]
    pub ssid: String,

    /// Pre-shared key (plaintext; prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Environment variable name containing the pre-shared key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_env: Option<String>,

    /// Profile priority. Defaults to the core's value when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            ssid: default_ssid(),
            key: None,
            key_env: None,
            priority: None,
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_ssid() -> String {
    "Nikon_WU2_0090B5210588".into()
}
fn default_host() -> String {
    "192.168.1.1".into()
}
fn default_port() -> u16 {
    15740
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimeoutSection {
    /// Overall bound on one connect, in seconds.
    #[serde(default = "default_connect_secs")]
    pub connect_secs: u64,

    /// Bound on a single probe connect, in milliseconds.
    #[serde(default = "default_probe_attempt_ms")]
    pub probe_attempt_ms: u64,

    /// Pause between failed probes, in milliseconds.
    #[serde(default)]
    pub probe_backoff_ms: u64,

    /// Give up probing after this many attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_max_attempts: Option<u32>,
}

impl Default for TimeoutSection {
    fn default() -> Self {
        Self {
            connect_secs: default_connect_secs(),
            probe_attempt_ms: default_probe_attempt_ms(),
            probe_backoff_ms: 0,
            probe_max_attempts: None,
        }
    }
}

fn default_connect_secs() -> u64 {
    20
}
fn default_probe_attempt_ms() -> u64 {
    2000
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "camlink", "camlink").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("camlink");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment. A missing file yields the
/// defaults.
///
/// Environment keys nest on a double underscore, e.g.
/// `CAMLINK_CAMERA__SSID` or `CAMLINK_TIMEOUTS__CONNECT_SECS`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CAMLINK_").split("__"));

    let config: Config = figment.extract()?;
    validate(&config)?;
    Ok(config)
}

/// Reject values the runtime cannot work with.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.camera.ssid.trim().is_empty() {
        return Err(invalid("camera.ssid", "must not be blank"));
    }
    if cfg.camera.host.trim().is_empty() {
        return Err(invalid("camera.host", "must not be blank"));
    }
    if cfg.camera.port == 0 {
        return Err(invalid("camera.port", "must be between 1 and 65535"));
    }
    if cfg.timeouts.connect_secs == 0 {
        return Err(invalid("timeouts.connect_secs", "must be positive"));
    }
    if cfg.timeouts.probe_attempt_ms == 0 {
        return Err(invalid("timeouts.probe_attempt_ms", "must be positive"));
    }
    if cfg.timeouts.probe_max_attempts == Some(0) {
        return Err(invalid("timeouts.probe_max_attempts", "must be positive"));
    }
    Ok(())
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    validate(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── Key resolution ──────────────────────────────────────────────────

fn keyring_entry(ssid: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{ssid}/psk"))
}

/// Resolve the pre-shared key. `None` means an open network.
pub fn resolve_key(camera: &CameraSection) -> Option<SecretString> {
    // 1. key_env → env var lookup
    if let Some(ref env_name) = camera.key_env {
        if let Ok(val) = std::env::var(env_name) {
            debug!(env = %env_name, "pre-shared key from environment");
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(&camera.ssid) {
        if let Ok(secret) = entry.get_password() {
            debug!(ssid = %camera.ssid, "pre-shared key from keyring");
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    camera.key.clone().map(SecretString::from)
}

/// Store a pre-shared key for `ssid` in the system keyring.
pub fn store_key(ssid: &str, key: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(ssid)?.set_password(key.expose_secret())?;
    Ok(())
}

// ── Translation to runtime types ────────────────────────────────────

/// Everything needed to build a `camlink_core::Session`.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub profile: WirelessProfile,
    pub target: AccessPointTarget,
    pub orchestrator: OrchestratorConfig,
}

/// Build runtime settings from a loaded config, resolving the key.
pub fn camera_settings(cfg: &Config) -> Result<CameraSettings, ConfigError> {
    validate(cfg)?;
    let camera = &cfg.camera;

    let mut profile = WirelessProfile::new(camera.ssid.clone(), resolve_key(camera));
    if let Some(priority) = camera.priority {
        profile = profile.with_priority(priority);
    }

    let orchestrator = OrchestratorConfig {
        connect_timeout: Duration::from_secs(cfg.timeouts.connect_secs),
        probe: ProbePolicy {
            attempt_timeout: Duration::from_millis(cfg.timeouts.probe_attempt_ms),
            backoff: Duration::from_millis(cfg.timeouts.probe_backoff_ms),
            max_attempts: cfg.timeouts.probe_max_attempts,
        },
    };

    Ok(CameraSettings {
        profile,
        target: AccessPointTarget::new(camera.host.clone(), camera.port),
        orchestrator,
    })
}
