// ── Runtime connection tuning ──
//
// How long a connect may take and how the control socket is probed.
// Never touches disk: camlink-config builds one and hands it in.

use std::time::Duration;

use crate::prober::ProbePolicy;

/// Tuning for [`Orchestrator`](crate::Orchestrator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Overall bound on one connect, across all stages. Default: 20s.
    pub connect_timeout: Duration,
    /// Reachability probing policy.
    pub probe: ProbePolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(20),
            probe: ProbePolicy::default(),
        }
    }
}
