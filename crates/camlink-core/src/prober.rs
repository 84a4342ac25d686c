// ── Control socket reachability ──
//
// After binding, the camera may still need a moment before its control
// socket accepts connections. Probing is a lazy stream of attempts:
// nothing happens until it is polled, and dropping it stops it.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use futures_core::Stream;
use futures_util::StreamExt;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::AccessPointTarget;
use crate::os::SocketConnector;

/// Retry policy for reachability probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbePolicy {
    /// Upper bound for a single connection attempt. Default: 2s.
    pub attempt_timeout: Duration,

    /// Pause between a failed attempt and the next one. Default: none.
    pub backoff: Duration,

    /// Give up after this many attempts. `None` retries until the
    /// caller's overall timeout or cancellation stops it.
    pub max_attempts: Option<u32>,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(2),
            backoff: Duration::ZERO,
            max_attempts: None,
        }
    }
}

/// Outcome of one connection attempt.
#[derive(Debug)]
pub struct ProbeAttempt {
    /// 1-based attempt number.
    pub attempt: u32,
    pub result: io::Result<()>,
}

/// Lazy stream of connection attempts against `target`.
///
/// Ends after the first successful attempt, or once `max_attempts` is
/// exhausted. Each attempt is bounded by `attempt_timeout` even if the
/// connector ignores the timeout it is given.
pub fn probe_attempts<'a>(
    connector: &'a dyn SocketConnector,
    target: &'a AccessPointTarget,
    policy: &'a ProbePolicy,
) -> impl Stream<Item = ProbeAttempt> + Send + 'a {
    async_stream::stream! {
        let mut attempt: u32 = 0;
        loop {
            if policy.max_attempts.is_some_and(|max| attempt >= max) {
                break;
            }
            if attempt > 0 && !policy.backoff.is_zero() {
                tokio::time::sleep(policy.backoff).await;
            }
            attempt += 1;

            let result = tokio::time::timeout(
                policy.attempt_timeout,
                connector.connect(target, policy.attempt_timeout),
            )
            .await
            .unwrap_or_else(|_| {
                Err(io::Error::new(io::ErrorKind::TimedOut, "connect attempt timed out"))
            });

            let reachable = result.is_ok();
            yield ProbeAttempt { attempt, result };
            if reachable {
                break;
            }
        }
    }
}

/// Third pipeline stage: wait until the camera's control socket accepts
/// a TCP connection.
pub struct Prober {
    connector: Arc<dyn SocketConnector>,
    policy: ProbePolicy,
}

impl Prober {
    pub fn new(connector: Arc<dyn SocketConnector>, policy: ProbePolicy) -> Self {
        Self { connector, policy }
    }

    pub fn policy(&self) -> &ProbePolicy {
        &self.policy
    }

    /// Probe until reachable. `attempts` tracks how many attempts were
    /// made, so a caller that times the probe out can still report it.
    pub async fn probe(
        &self,
        target: &AccessPointTarget,
        attempts: &mut u32,
    ) -> Result<(), CoreError> {
        let mut stream = std::pin::pin!(probe_attempts(
            self.connector.as_ref(),
            target,
            &self.policy
        ));

        while let Some(ProbeAttempt { attempt, result }) = stream.next().await {
            *attempts = attempt;
            match result {
                Ok(()) => {
                    info!(%target, attempt, "control socket reachable");
                    return Ok(());
                }
                Err(e) => warn!(%target, attempt, error = %e, "control socket not reachable yet"),
            }
        }

        Err(CoreError::SocketUnreachable {
            target: target.to_string(),
            attempts: *attempts,
            warnings: Vec::new(),
        })
    }
}
