//! # Acquisition parameters.
//!
//! [`AcquireSpec`] bundles how one acquisition polls (pacing) and how long it
//! may take (timeout). A spec can be created:
//! - **Explicitly** with [`AcquireSpec::new`]
//! - **From config** with [`AcquireSpec::with_defaults`]

use std::time::Duration;

use crate::{core::config::Config, error::AcquireError, policies::BackoffPolicy};

/// Parameters of one acquisition.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use pollvisor::{AcquireSpec, Config};
///
/// let spec = AcquireSpec::new(Duration::from_millis(100), Duration::from_secs(10));
/// assert_eq!(spec.poll_interval(), Duration::from_millis(100));
///
/// let cfg = Config::default();
/// let from_cfg = AcquireSpec::with_defaults(&cfg);
/// assert_eq!(from_cfg.timeout(), cfg.timeout);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcquireSpec {
    pacing: BackoffPolicy,
    timeout: Duration,
}

impl AcquireSpec {
    /// Creates a spec with a constant poll interval.
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            pacing: BackoffPolicy::constant(poll_interval),
            timeout,
        }
    }

    /// Creates a spec inheriting interval and timeout from global config.
    pub fn with_defaults(cfg: &Config) -> Self {
        Self::new(cfg.poll_interval, cfg.timeout)
    }

    /// Returns a new spec with custom pacing; `pacing.first` becomes the poll interval.
    pub fn with_pacing(mut self, pacing: BackoffPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    /// Returns a new spec with another timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay after the first empty poll.
    pub fn poll_interval(&self) -> Duration {
        self.pacing.first
    }

    /// Acquisition timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Inter-poll pacing.
    pub fn pacing(&self) -> BackoffPolicy {
        self.pacing
    }

    /// Rejects parameters that cannot drive an acquisition.
    pub fn validate(&self) -> Result<(), AcquireError> {
        if self.timeout.is_zero() {
            return Err(AcquireError::InvalidSpec {
                reason: "timeout must be greater than zero",
            });
        }
        self.pacing
            .validate()
            .map_err(|reason| AcquireError::InvalidSpec { reason })
    }
}
