//! # Terminal outcome of one acquisition.
//!
//! Every [`OperationHandle`](crate::OperationHandle) ends in exactly one [`Outcome`]:
//! ```text
//! Pending ──► Success(Detection)   first element of the first non-empty poll
//!         ──► Timeout              deadline elapsed
//!         ──► Cancelled(reason)    caller cancel / supervisor shutdown
//!         ──► Error(err)           source missing or poll failed
//! ```

use std::time::Duration;

use crate::error::AcquireError;
use crate::source::Detection;

/// Who cancelled a pending acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller cancelled the handle (or cancelled it by id).
    Caller,
    /// The supervisor was shut down while the acquisition was pending.
    Shutdown,
}

/// The single terminal result of an acquisition.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A detection won the race.
    Success(Detection),
    /// The deadline elapsed before any detection.
    Timeout,
    /// The acquisition was cancelled before it resolved otherwise.
    Cancelled(CancelReason),
    /// The acquisition failed (`NotInitialized` or `Source`).
    Error(AcquireError),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Success`].
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns the detection if the acquisition succeeded.
    pub fn detection(&self) -> Option<&Detection> {
        match self {
            Outcome::Success(d) => Some(d),
            _ => None,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Timeout => "timeout",
            Outcome::Cancelled(CancelReason::Caller) => "cancelled",
            Outcome::Cancelled(CancelReason::Shutdown) => "interrupted",
            Outcome::Error(e) => e.as_label(),
        }
    }

    /// Converts the outcome into a `Result`.
    ///
    /// `timeout` is the acquisition's configured timeout; it is only used to
    /// fill [`AcquireError::Timeout`].
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use pollvisor::{CancelReason, Outcome};
    ///
    /// let err = Outcome::Cancelled(CancelReason::Shutdown)
    ///     .into_result(Duration::from_secs(1))
    ///     .unwrap_err();
    /// assert_eq!(err.code(), "INTERRUPTED");
    /// ```
    pub fn into_result(self, timeout: Duration) -> Result<Detection, AcquireError> {
        match self {
            Outcome::Success(d) => Ok(d),
            Outcome::Timeout => Err(AcquireError::Timeout { timeout }),
            Outcome::Cancelled(CancelReason::Caller) => Err(AcquireError::Cancelled),
            Outcome::Cancelled(CancelReason::Shutdown) => Err(AcquireError::Interrupted),
            Outcome::Error(e) => Err(e),
        }
    }

    /// Converts the outcome into the hex text of the detection.
    pub fn into_hex(self, timeout: Duration) -> Result<String, AcquireError> {
        self.into_result(timeout).map(|d| d.to_hex())
    }
}
