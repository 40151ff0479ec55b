//! Waiting for asynchronous Atlas operations
//!
//! Cluster provisioning, snapshot creation, restore jobs and access-list
//! propagation all finish some time after the request that starts them.
//! [`StateChangeConf`] drives a bounded polling loop over a status-check
//! callback until the operation reaches a target state, times out, or fails.
//!
//! ```no_run
//! use mongodbatlas::core::poll::{Refresh, StateChangeConf};
//! use std::time::Duration;
//!
//! # async fn example() -> mongodbatlas::domain::Result<()> {
//! let conf = StateChangeConf::new(["queued", "inProgress"], ["completed"])
//!     .with_timeout(Duration::from_secs(3600))
//!     .with_poll_interval(Duration::from_secs(60));
//!
//! let snapshot: Option<String> = conf
//!     .wait_for_state(|| async { Ok(Refresh::new("snap".to_string(), "completed")) })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::domain::{PollError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Whether the wait belongs to a create/update or to a delete
///
/// During deletion a "not found" answer means the object is gone, which is
/// the goal. During creation it is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollMode {
    #[default]
    Create,
    Delete,
}

/// One observation returned by a status-check callback
#[derive(Debug, Clone)]
pub struct Refresh<T> {
    /// Latest view of the remote object, if the callback has one
    pub resource: Option<T>,

    /// Status string compared against the pending and target sets
    pub status: String,
}

impl<T> Refresh<T> {
    pub fn new(resource: T, status: impl Into<String>) -> Self {
        Self {
            resource: Some(resource),
            status: status.into(),
        }
    }

    /// An observation that carries a status but no resource
    pub fn status_only(status: impl Into<String>) -> Self {
        Self {
            resource: None,
            status: status.into(),
        }
    }
}

/// Polling configuration for one wait
#[derive(Debug, Clone)]
pub struct StateChangeConf {
    /// Statuses meaning "keep waiting"
    pub pending: Vec<String>,

    /// Statuses meaning "done"
    pub target: Vec<String>,

    /// Overall budget, measured from the start of the wait
    pub timeout: Duration,

    /// Sleep between two status checks
    pub poll_interval: Duration,

    /// Sleep before the first status check
    pub delay: Duration,

    pub mode: PollMode,
}

impl StateChangeConf {
    /// Creates a configuration with a 20 minute timeout, 10 second interval
    /// and no initial delay
    pub fn new<P, T>(pending: P, target: T) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            pending: pending.into_iter().map(Into::into).collect(),
            target: target.into_iter().map(Into::into).collect(),
            timeout: Duration::from_secs(20 * 60),
            poll_interval: Duration::from_secs(10),
            delay: Duration::ZERO,
            mode: PollMode::Create,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Treat "not found" as the terminal deleted state
    pub fn for_deletion(mut self) -> Self {
        self.mode = PollMode::Delete;
        self
    }

    fn is_target(&self, status: &str) -> bool {
        self.target.iter().any(|t| t == status)
    }

    fn is_pending(&self, status: &str) -> bool {
        self.pending.iter().any(|p| p == status)
    }

    /// Polls `refresh` until a target status is observed
    ///
    /// Returns the last resource seen with a target status, or `None` when
    /// the resource vanished during a deletion wait.
    ///
    /// # Errors
    ///
    /// - [`PollError::Timeout`] when the budget runs out while the status is
    ///   pending or the callback keeps failing transiently
    /// - [`PollError::UnexpectedState`] as soon as a status outside both sets
    ///   is observed
    /// - [`PollError::Fatal`] as soon as the callback fails with an error that
    ///   is neither transient nor an expected "not found"
    pub async fn wait_for_state<T, F, Fut>(
        &self,
        mut refresh: F,
    ) -> std::result::Result<Option<T>, PollError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Refresh<T>>>,
    {
        let start = Instant::now();
        let mut attempt: u32 = 0;
        let mut last_status = String::new();
        let mut last_error: Option<String>;

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        loop {
            attempt += 1;

            match refresh().await {
                Ok(observed) => {
                    tracing::debug!(
                        attempt = attempt,
                        status = %observed.status,
                        "Polled operation status"
                    );
                    last_error = None;

                    if self.is_target(&observed.status) {
                        return Ok(observed.resource);
                    }

                    if !self.is_pending(&observed.status) {
                        tracing::warn!(
                            attempt = attempt,
                            status = %observed.status,
                            target = ?self.target,
                            "Operation reached an unexpected state"
                        );
                        return Err(PollError::UnexpectedState {
                            status: observed.status,
                            target: self.target.join(", "),
                        });
                    }

                    last_status = observed.status;
                }
                Err(err) if self.mode == PollMode::Delete && err.is_not_found() => {
                    tracing::debug!(attempt = attempt, "Resource no longer exists");
                    return Ok(None);
                }
                Err(err) if err.is_transient() => {
                    tracing::warn!(
                        attempt = attempt,
                        error = %err,
                        "Transient error while polling, retrying"
                    );
                    last_error = Some(err.to_string());
                }
                Err(err) => {
                    tracing::warn!(attempt = attempt, error = %err, "Polling aborted");
                    return Err(PollError::Fatal(Box::new(err)));
                }
            }

            if start.elapsed().saturating_add(self.poll_interval) > self.timeout {
                tracing::warn!(
                    attempt = attempt,
                    last_status = %last_status,
                    timeout_secs = self.timeout.as_secs(),
                    "Timed out waiting for operation"
                );
                return Err(PollError::Timeout {
                    target: self.target.join(", "),
                    last_status,
                    timeout: self.timeout,
                    last_error,
                });
            }

            sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let conf = StateChangeConf::new(["CREATING"], ["IDLE"])
            .with_timeout(Duration::from_secs(3))
            .with_poll_interval(Duration::from_secs(2))
            .with_delay(Duration::from_secs(1))
            .for_deletion();

        assert_eq!(conf.pending, vec!["CREATING".to_string()]);
        assert_eq!(conf.target, vec!["IDLE".to_string()]);
        assert_eq!(conf.timeout, Duration::from_secs(3));
        assert_eq!(conf.poll_interval, Duration::from_secs(2));
        assert_eq!(conf.delay, Duration::from_secs(1));
        assert_eq!(conf.mode, PollMode::Delete);
    }

    #[tokio::test]
    async fn test_immediate_target_returns_resource() {
        let conf = StateChangeConf::new(["pending"], ["created"])
            .with_poll_interval(Duration::ZERO);

        let result = conf
            .wait_for_state(|| async { Ok(Refresh::new(7_u32, "created")) })
            .await
            .unwrap();

        assert_eq!(result, Some(7));
    }

    #[tokio::test]
    async fn test_status_only_target() {
        let conf = StateChangeConf::new(["DELETING"], ["DELETED"])
            .with_poll_interval(Duration::ZERO)
            .for_deletion();

        let result: Option<()> = conf
            .wait_for_state(|| async { Ok(Refresh::status_only("DELETED")) })
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_saturated_interval_times_out_without_sleeping() {
        let conf = StateChangeConf::new(["CREATING"], ["IDLE"])
            .with_timeout(Duration::from_secs(1))
            .with_poll_interval(Duration::MAX);

        let err = conf
            .wait_for_state(|| async { Ok(Refresh::<()>::status_only("CREATING")) })
            .await
            .unwrap_err();

        assert!(err.is_timeout());
    }
}
