//! Bounded polling for eventual consistency
//!
//! Creation and deletion are asynchronous on the management plane; these
//! helpers poll a resource at a fixed interval until it reaches the wanted
//! condition or the retry budget runs out. Exhausting the budget is not an
//! error: callers get [`WaitOutcome::TimedOut`] and decide for themselves
//! whether to treat it as fatal.

use crate::backend::ResourceBackend;
use crate::resource::{MirrorState, ResourceHandle};
use std::time::Duration;
use tokio::time::sleep;

/// Polling parameters
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Delay between polls
    pub poll_interval: Duration,

    /// Retries after the initial poll; a wait makes `max_retries + 1` polls
    /// at most
    pub max_retries: u32,

    /// For volumes: additionally require the replication edge. Readiness
    /// then also needs a successful replication-status query, and absence
    /// polls the replication edge instead of the volume itself.
    pub check_replication: bool,

    /// Require the replication edge to report a healthy `Mirrored` state,
    /// not just answer the query. Used after authorization; a freshly
    /// created edge sits in `Uninitialized` until the baseline transfer
    /// completes.
    pub require_mirrored: bool,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            max_retries: 60,
            check_replication: false,
            require_mirrored: false,
        }
    }
}

impl WaitOptions {
    pub fn with_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn replication(mut self) -> Self {
        self.check_replication = true;
        self
    }

    pub fn mirrored(mut self) -> Self {
        self.check_replication = true;
        self.require_mirrored = true;
        self
    }
}

/// How a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The resource reached `Succeeded` (and, when requested, its
    /// replication edge became queryable)
    Ready,

    /// The management plane reported the resource gone
    Absent,

    /// The retry budget ran out without confirmation. The resource may
    /// still converge later; callers proceeding past this point act on an
    /// unconfirmed resource.
    TimedOut,
}

impl WaitOutcome {
    pub fn is_timed_out(&self) -> bool {
        matches!(self, WaitOutcome::TimedOut)
    }
}

/// Poll a resource until its provisioning state reports `Succeeded`.
///
/// Transient query errors count as "not yet ready" and are retried against
/// the same budget.
pub async fn wait_until_ready<B: ResourceBackend + ?Sized>(
    backend: &B,
    handle: &ResourceHandle,
    options: &WaitOptions,
) -> WaitOutcome {
    for attempt in 0..=options.max_retries {
        match backend.provisioning_state(handle).await {
            Ok(state) if state.is_succeeded() => {
                if !options.check_replication {
                    return WaitOutcome::Ready;
                }
                // A data-protection volume reports Succeeded before its
                // replication edge is queryable; require both.
                match backend.replication_status(handle).await {
                    Ok(status)
                        if !options.require_mirrored
                            || (status.mirror_state == MirrorState::Mirrored
                                && status.healthy) =>
                    {
                        return WaitOutcome::Ready;
                    }
                    Ok(status) => {
                        tracing::debug!(
                            resource = %handle,
                            attempt,
                            mirror_state = ?status.mirror_state,
                            "replication edge not mirrored yet"
                        );
                    }
                    Err(e) => {
                        tracing::debug!(
                            resource = %handle,
                            attempt,
                            "replication edge not queryable yet: {e}"
                        );
                    }
                }
            }
            Ok(state) => {
                tracing::debug!(resource = %handle, attempt, %state, "still provisioning");
            }
            Err(e) => {
                tracing::debug!(resource = %handle, attempt, "transient status error: {e}");
            }
        }

        if attempt < options.max_retries {
            sleep(options.poll_interval).await;
        }
    }

    tracing::warn!(
        resource = %handle,
        retries = options.max_retries,
        "readiness wait exhausted its retry budget"
    );
    WaitOutcome::TimedOut
}

/// Poll a resource until the management plane reports it gone.
///
/// Only a definitive not-found answer counts as absence; any other query
/// error is transient and retried. With `check_replication` set the
/// replication edge is polled instead of the volume (the edge must
/// disappear before the volume can be deleted).
pub async fn wait_until_absent<B: ResourceBackend + ?Sized>(
    backend: &B,
    handle: &ResourceHandle,
    options: &WaitOptions,
) -> WaitOutcome {
    for attempt in 0..=options.max_retries {
        let probe = if options.check_replication {
            backend.replication_status(handle).await.map(|_| ())
        } else {
            backend.provisioning_state(handle).await.map(|_| ())
        };

        match probe {
            Err(e) if e.is_not_found() => return WaitOutcome::Absent,
            Err(e) => {
                tracing::debug!(resource = %handle, attempt, "transient status error: {e}");
            }
            Ok(()) => {
                tracing::debug!(resource = %handle, attempt, "still present");
            }
        }

        if attempt < options.max_retries {
            sleep(options.poll_interval).await;
        }
    }

    tracing::warn!(
        resource = %handle,
        retries = options.max_retries,
        "absence wait exhausted its retry budget"
    );
    WaitOutcome::TimedOut
}
