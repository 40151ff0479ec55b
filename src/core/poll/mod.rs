//! Polling primitives for asynchronous Atlas operations
//!
//! - [`state_change`] waits for a status to move from a pending set to a
//!   target set
//! - [`retry`] re-runs an operation while it fails transiently
//!
//! [`PollSettings`] carries the process-wide scaling from the `[polling]`
//! configuration section into every wait.

pub mod retry;
pub mod state_change;

pub use retry::{retry_until, Backoff, RetryError};
pub use state_change::{PollMode, Refresh, StateChangeConf};

use crate::config::ProviderConfig;
use std::time::Duration;

/// Scaling applied to resource waits
#[derive(Debug, Clone, PartialEq)]
pub struct PollSettings {
    /// Multiplier for delays and poll intervals
    pub interval_scale: f64,

    /// Upper bound for a single poll interval after scaling
    pub max_interval: Option<Duration>,

    /// Backoff for retried reads and deletes
    pub backoff: Backoff,
}

impl PollSettings {
    /// Settings without any waiting, used by tests against a mock API
    pub fn immediate() -> Self {
        Self {
            interval_scale: 0.0,
            max_interval: None,
            backoff: Backoff::fixed(Duration::ZERO),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        let retry = &config.atlas.retry;
        Self {
            interval_scale: config.polling.interval_scale,
            max_interval: config.polling.max_interval_seconds.map(Duration::from_secs),
            backoff: Backoff {
                initial: Duration::from_millis(retry.initial_delay_ms),
                max: Duration::from_millis(retry.max_delay_ms),
                multiplier: retry.backoff_multiplier,
            },
        }
    }

    /// Scales one delay or interval
    pub fn scale(&self, duration: Duration) -> Duration {
        let scaled = Duration::try_from_secs_f64(duration.as_secs_f64() * self.interval_scale.max(0.0))
            .unwrap_or(Duration::MAX);
        match self.max_interval {
            Some(max) if scaled > max => max,
            _ => scaled,
        }
    }

    /// Applies the scaling to a wait configuration, leaving its timeout as is
    pub fn apply(&self, conf: StateChangeConf) -> StateChangeConf {
        let delay = self.scale(conf.delay);
        let poll_interval = self.scale(conf.poll_interval);
        conf.with_delay(delay).with_poll_interval(poll_interval)
    }

    /// The retry backoff, scaled like poll intervals
    pub fn retry_backoff(&self) -> Backoff {
        Backoff {
            initial: self.scale(self.backoff.initial),
            max: self.scale(self.backoff.max),
            multiplier: self.backoff.multiplier,
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_scale: 1.0,
            max_interval: None,
            backoff: Backoff::default(),
        }
    }
}
