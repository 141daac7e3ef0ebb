//! # Runtime events emitted by the supervisor and its operations.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Acquisition events**: start, empty polls, and the terminal step of each operation
//! - **Arbitration events**: losing resolvers and background cleanup
//! - **Runtime events**: shutdown and subscriber health
//!
//! The [`Event`] struct carries additional metadata such as the operation id,
//! poll count, delays and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use pollvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::PollEmpty)
//!     .with_op(7)
//!     .with_source("uhf-reader")
//!     .with_polls(3)
//!     .with_delay(Duration::from_millis(100));
//!
//! assert_eq!(ev.kind, EventKind::PollEmpty);
//! assert_eq!(ev.op, Some(7));
//! assert_eq!(ev.delay_ms, Some(100));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::OperationId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Acquisition events ===
    /// An acquisition was started.
    ///
    /// Sets: `op`, `source`, `timeout_ms`, `delay_ms` (first poll interval).
    AcquireStarted,

    /// A poll returned nothing; the driver sleeps before the next one.
    ///
    /// Sets: `op`, `source`, `polls`, `delay_ms`.
    PollEmpty,

    /// A poll returned detections; the first one resolved the operation.
    ///
    /// Sets: `op`, `source`, `polls`, `discarded` (other detections of that poll).
    DetectionFound,

    /// The deadline elapsed before any other resolver.
    ///
    /// Sets: `op`, `timeout_ms`.
    TimeoutHit,

    /// A caller asked to cancel an operation.
    ///
    /// Sets: `op`.
    CancelRequested,

    /// A caller cancellation resolved the operation.
    ///
    /// Sets: `op`.
    AcquireCancelled,

    /// Supervisor shutdown resolved the operation.
    ///
    /// Sets: `op`.
    AcquireInterrupted,

    /// The source failed; the failure resolved the operation.
    ///
    /// Sets: `op`, `source`, `polls`, `reason`.
    SourceFailed,

    /// No source was configured; the operation resolved without polling.
    ///
    /// Sets: `op`.
    SourceMissing,

    // === Arbitration events ===
    /// A resolver arrived after the operation was already resolved; ignored.
    ///
    /// Sets: `op`, `reason` (which resolver lost).
    LateResolveIgnored,

    /// Driver and timer stopped; the operation left the registry.
    ///
    /// Sets: `op`, `polls`, `reason` (outcome label).
    OperationReleased,

    // === Runtime events ===
    /// Shutdown requested.
    ShutdownRequested,

    /// All operations released within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some operations were still busy.
    GraceExceeded,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `source` (subscriber name), `reason`.
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `source` (subscriber name), `reason`.
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Operation the event belongs to.
    pub op: Option<OperationId>,
    /// Source (or subscriber) name.
    pub source: Option<Arc<str>>,
    /// Number of polls issued so far by the operation.
    pub polls: Option<u32>,
    /// Acquisition timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Delay before the next poll in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Detections discarded because an earlier one in the same poll won.
    pub discarded: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            op: None,
            source: None,
            polls: None,
            timeout_ms: None,
            delay_ms: None,
            discarded: None,
            reason: None,
        }
    }

    /// Attaches an operation id.
    #[inline]
    pub fn with_op(mut self, op: OperationId) -> Self {
        self.op = Some(op);
        self
    }

    /// Attaches a source name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches the poll count.
    #[inline]
    pub fn with_polls(mut self, n: u32) -> Self {
        self.polls = Some(n);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a poll delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches the number of discarded detections.
    #[inline]
    pub fn with_discarded(mut self, n: usize) -> Self {
        self.discarded = Some(n.min(u32::MAX as usize) as u32);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
