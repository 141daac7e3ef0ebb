//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the supervisor runtime.
//!
//! Config is used in two ways:
//! 1. **Supervisor creation**: `Supervisor::builder(config)`
//! 2. **Acquisition defaults**: `AcquireSpec::with_defaults(&config)`
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unlimited (no semaphore created)

use std::time::Duration;

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `poll_interval`: default delay between empty polls
/// - `timeout`: default acquisition timeout
/// - `grace`: maximum wait for background work on shutdown
/// - `max_concurrent`: acquisitions allowed to poll at once (`0` = unlimited)
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Default delay between two polls when the previous one found nothing.
    pub poll_interval: Duration,

    /// Default acquisition timeout, measured from `start`.
    pub timeout: Duration,

    /// Maximum time [`Supervisor::shutdown`](crate::Supervisor::shutdown) waits
    /// for drivers and timers to stop.
    pub grace: Duration,

    /// Maximum number of acquisitions polling at the same time.
    ///
    /// - `0` = unlimited (no semaphore)
    /// - `1` = serialize acquisitions against one physical source
    ///
    /// Waiting for a slot counts against the acquisition's timeout.
    pub max_concurrent: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the concurrency limit as an `Option` (`None` = unlimited).
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent == 0 {
            None
        } else {
            Some(self.max_concurrent)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `poll_interval = 100ms`
    /// - `timeout = 10s`
    /// - `grace = 5s`
    /// - `max_concurrent = 0` (unlimited)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(10),
            grace: Duration::from_secs(5),
            max_concurrent: 0,
            bus_capacity: 1024,
        }
    }
}
