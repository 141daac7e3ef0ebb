//! Error types used by the pollvisor runtime and sources.
//!
//! This module defines three error types:
//!
//! - [`AcquireError`] - why an acquisition did not produce a detection.
//! - [`SourceError`] - failures reported by a [`Source`](crate::Source) poll.
//! - [`RuntimeError`] - errors raised by the supervisor itself.
//!
//! All of them provide `as_label` for logs/metrics; [`AcquireError`] also
//! exposes [`AcquireError::code`], the coarse category a host caller
//! discriminates on (`TIMEOUT`, `CANCELLED`, `INTERRUPTED`, ...).

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::core::OperationId;

/// Boxed underlying cause carried by a [`SourceError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors produced by the pollvisor runtime.
///
/// These represent failures in the supervisor itself, not in a single acquisition.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some operations were still busy.
    #[error("shutdown timeout {grace:?} exceeded; stuck operations: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Identifiers of operations whose background work did not stop in time.
        stuck: Vec<OperationId>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pollvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck operations={stuck:?}")
            }
        }
    }
}

/// # Failure reported by a source poll.
///
/// Carries a human-readable message and, optionally, the underlying cause
/// (available through [`std::error::Error::source`]).
///
/// # Example
/// ```
/// use pollvisor::SourceError;
///
/// let io = std::io::Error::other("antenna disconnected");
/// let err = SourceError::with_cause("inventory failed", io);
/// assert_eq!(err.to_string(), "inventory failed");
/// assert!(std::error::Error::source(&err).is_some());
/// ```
#[derive(Error, Debug)]
#[error("{message}")]
pub struct SourceError {
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl SourceError {
    /// Creates an error with a message and no underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an error wrapping an underlying cause.
    pub fn with_cause(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// Returns the message without the cause chain.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// # Why an acquisition did not yield a detection.
///
/// [`Outcome::into_result`](crate::Outcome::into_result) maps every non-success
/// outcome onto one of these variants. The enum is `Clone` so the same value can
/// be handed to every waiter of an operation; source causes are shared via `Arc`.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum AcquireError {
    /// No source was supplied to the supervisor; nothing was polled.
    #[error("source is not initialized")]
    NotInitialized,

    /// No detection arrived before the deadline.
    #[error("no detection within {timeout:?}")]
    Timeout {
        /// The acquisition timeout that elapsed.
        timeout: Duration,
    },

    /// The caller cancelled the acquisition.
    #[error("acquisition cancelled")]
    Cancelled,

    /// The supervisor shut down while the acquisition was pending.
    #[error("acquisition interrupted by shutdown")]
    Interrupted,

    /// The source failed while polling.
    #[error("source failed: {error}")]
    Source {
        /// The failure reported by the source, cause preserved.
        #[source]
        error: Arc<SourceError>,
    },

    /// Acquisition parameters were rejected before anything started.
    #[error("invalid acquisition spec: {reason}")]
    InvalidSpec {
        /// What was wrong with the parameters.
        reason: &'static str,
    },
}

impl AcquireError {
    /// Wraps a source failure.
    pub fn from_source(error: SourceError) -> Self {
        AcquireError::Source {
            error: Arc::new(error),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            AcquireError::NotInitialized => "acquire_not_initialized",
            AcquireError::Timeout { .. } => "acquire_timeout",
            AcquireError::Cancelled => "acquire_cancelled",
            AcquireError::Interrupted => "acquire_interrupted",
            AcquireError::Source { .. } => "acquire_source_failed",
            AcquireError::InvalidSpec { .. } => "acquire_invalid_spec",
        }
    }

    /// Returns the category code a host caller discriminates on.
    ///
    /// # Example
    /// ```
    /// use pollvisor::AcquireError;
    /// use std::time::Duration;
    ///
    /// let err = AcquireError::Timeout { timeout: Duration::from_secs(10) };
    /// assert_eq!(err.code(), "TIMEOUT");
    /// assert_eq!(AcquireError::NotInitialized.code(), "NOT_INITIALIZED");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            AcquireError::NotInitialized => "NOT_INITIALIZED",
            AcquireError::Timeout { .. } => "TIMEOUT",
            AcquireError::Cancelled => "CANCELLED",
            AcquireError::Interrupted => "INTERRUPTED",
            AcquireError::Source { .. } => "ERROR",
            AcquireError::InvalidSpec { .. } => "INVALID_SPEC",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            AcquireError::NotInitialized => "source is not initialized".to_string(),
            AcquireError::Timeout { timeout } => {
                format!("no detection within the timeout period ({timeout:?})")
            }
            AcquireError::Cancelled => "acquisition was cancelled".to_string(),
            AcquireError::Interrupted => "acquisition was interrupted".to_string(),
            AcquireError::Source { error } => {
                format!("an error occurred during polling: {error}")
            }
            AcquireError::InvalidSpec { reason } => format!("invalid spec: {reason}"),
        }
    }

    /// Indicates whether the caller may reasonably issue a new acquisition.
    ///
    /// `Timeout` and `Source` failures are transient; the rest are either
    /// deliberate (`Cancelled`, `Interrupted`) or need fixing first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AcquireError::Timeout { .. } | AcquireError::Source { .. }
        )
    }
}
