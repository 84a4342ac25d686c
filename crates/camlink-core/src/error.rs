// ── Core error types ──
//
// Every terminal failure of connect/disconnect surfaces as one
// `CoreError` with a human-readable message. Toggle failures that did
// not abort the pipeline ride along as `warnings` on whatever terminal
// error the attempt ends with.

use thiserror::Error;

use crate::os::OsError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Association errors ───────────────────────────────────────────
    #[error("OS rejected the wireless profile for {ssid}")]
    ProfileCreation { ssid: String },

    #[error("Wireless profile for {ssid} should exist at this point (it was just added)")]
    ProfileMissing { ssid: String },

    #[error(
        "Association with {ssid} not confirmed within {timeout_secs}s{}",
        warning_suffix(.warnings)
    )]
    AssociationTimeout {
        ssid: String,
        timeout_secs: u64,
        /// Non-fatal toggle failures recorded before the timeout fired.
        warnings: Vec<String>,
    },

    // ── Binding errors ───────────────────────────────────────────────
    #[error(
        "No wireless network became available within {timeout_secs}s{}",
        warning_suffix(.warnings)
    )]
    BindTimeout {
        timeout_secs: u64,
        warnings: Vec<String>,
    },

    // ── Reachability errors ──────────────────────────────────────────
    #[error(
        "Camera control socket {target} unreachable after {attempts} attempts{}",
        warning_suffix(.warnings)
    )]
    SocketUnreachable {
        target: String,
        attempts: u32,
        /// Includes a failed process bind, which routes probes elsewhere.
        warnings: Vec<String>,
    },

    // ── Disconnect errors ────────────────────────────────────────────
    #[error("Not connected with {ssid} or not in the expected state")]
    NotConnected { ssid: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Connection attempt cancelled")]
    Cancelled,

    #[error("A connection attempt is already active")]
    AttemptInProgress,

    #[error("Already connected; disconnect first")]
    AlreadyConnected,

    // ── OS collaborator errors ───────────────────────────────────────
    #[error("{operation} failed: {source}")]
    Os {
        operation: &'static str,
        #[source]
        source: OsError,
    },
}

impl CoreError {
    pub(crate) fn os(operation: &'static str, source: OsError) -> Self {
        Self::Os { operation, source }
    }

    /// Append non-fatal failures recorded during the attempt. Variants
    /// without a `warnings` field are returned unchanged.
    pub(crate) fn with_warnings(mut self, recorded: Vec<String>) -> Self {
        if let Self::AssociationTimeout { warnings, .. }
        | Self::BindTimeout { warnings, .. }
        | Self::SocketUnreachable { warnings, .. } = &mut self
        {
            warnings.extend(recorded);
        }
        self
    }

    /// Non-fatal failures recorded before this error, if any.
    pub fn warnings(&self) -> &[String] {
        match self {
            Self::AssociationTimeout { warnings, .. }
            | Self::BindTimeout { warnings, .. }
            | Self::SocketUnreachable { warnings, .. } => warnings,
            _ => &[],
        }
    }

    /// Whether re-invoking `connect()` could plausibly succeed.
    ///
    /// A state mismatch on disconnect or a broken profile store will not
    /// fix itself; timeouts and cancellations might.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AssociationTimeout { .. }
                | Self::BindTimeout { .. }
                | Self::SocketUnreachable { .. }
                | Self::Cancelled
        )
    }
}

fn warning_suffix(warnings: &[String]) -> String {
    if warnings.is_empty() {
        String::new()
    } else {
        format!(" (warnings: {})", warnings.join("; "))
    }
}
