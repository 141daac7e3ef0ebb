//! # One in-flight acquisition.
//!
//! An [`OperationHandle`] is the caller's view of one acquisition: identity,
//! deadline, status and the single-delivery [`OutcomeSlot`]. Internally every
//! resolver (driver, timer, cancel, shutdown) funnels through
//! `Operation::resolve`, the only place a status transition happens.
//!
//! ## Lifecycle
//! ```text
//! start ──► Pending ──resolve (first writer)──► Resolved ──cleanup──► released
//!                          │                        │
//!                          │ stop.cancel()          └─ later resolvers: LateResolveIgnored
//!                          ▼
//!                  driver + timer stop
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    core::spec::AcquireSpec,
    error::AcquireError,
    events::{Bus, Event, EventKind},
    outcome::{CancelReason, Outcome, OutcomeSlot},
    source::Detection,
};

/// Deadline used when `started_at + timeout` is not representable (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Identifier of an acquisition; unique and increasing per supervisor.
pub type OperationId = u64;

/// Observable status of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No resolver has won yet.
    Pending,
    /// The outcome is fixed.
    Resolved,
}

/// Which resolver attempted a transition (used for diagnostics only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolver {
    Driver,
    Timer,
    Caller,
    Shutdown,
    Supervisor,
}

impl Resolver {
    fn as_str(self) -> &'static str {
        match self {
            Resolver::Driver => "driver",
            Resolver::Timer => "timer",
            Resolver::Caller => "caller",
            Resolver::Shutdown => "shutdown",
            Resolver::Supervisor => "supervisor",
        }
    }
}

/// Shared state of one acquisition.
pub(crate) struct Operation {
    pub(crate) id: OperationId,
    pub(crate) source_name: Arc<str>,
    pub(crate) started_at: Instant,
    pub(crate) deadline: Instant,
    pub(crate) timeout: Duration,
    /// Cancelled on resolution (or shutdown); driver and timer stop on it.
    pub(crate) stop: CancellationToken,
    /// Cancelled once driver and timer have been joined.
    pub(crate) released: CancellationToken,
    slot: OutcomeSlot,
    polls: AtomicU32,
    bus: Bus,
}

impl Operation {
    pub(crate) fn new(
        id: OperationId,
        source_name: Arc<str>,
        spec: &AcquireSpec,
        stop: CancellationToken,
        bus: Bus,
    ) -> Arc<Self> {
        let started_at = Instant::now();
        let deadline = started_at
            .checked_add(spec.timeout())
            .or_else(|| started_at.checked_add(FAR_FUTURE))
            .unwrap_or(started_at);
        Arc::new(Self {
            id,
            source_name,
            started_at,
            deadline,
            timeout: spec.timeout(),
            stop,
            released: CancellationToken::new(),
            slot: OutcomeSlot::new(),
            polls: AtomicU32::new(0),
            bus,
        })
    }

    /// Resolves with the default terminal event for `outcome`.
    pub(crate) fn resolve(&self, outcome: Outcome, by: Resolver) -> bool {
        let event = self.terminal_event(&outcome);
        self.resolve_with(outcome, by, event)
    }

    /// Resolves and, only if this call wins, publishes `event`.
    ///
    /// A winning call also cancels `stop`, so the driver and timer end at their
    /// next suspension point.
    pub(crate) fn resolve_with(&self, outcome: Outcome, by: Resolver, event: Event) -> bool {
        if self.slot.resolve(outcome) {
            self.stop.cancel();
            self.bus.publish(event);
            true
        } else {
            self.bus.publish(
                Event::new(EventKind::LateResolveIgnored)
                    .with_op(self.id)
                    .with_reason(by.as_str()),
            );
            false
        }
    }

    fn terminal_event(&self, outcome: &Outcome) -> Event {
        let kind = match outcome {
            Outcome::Success(_) => EventKind::DetectionFound,
            Outcome::Timeout => EventKind::TimeoutHit,
            Outcome::Cancelled(CancelReason::Caller) => EventKind::AcquireCancelled,
            Outcome::Cancelled(CancelReason::Shutdown) => EventKind::AcquireInterrupted,
            Outcome::Error(AcquireError::NotInitialized) => EventKind::SourceMissing,
            Outcome::Error(_) => EventKind::SourceFailed,
        };
        let ev = Event::new(kind)
            .with_op(self.id)
            .with_polls(self.polls());
        match outcome {
            Outcome::Timeout => ev.with_timeout(self.timeout),
            Outcome::Error(e) => ev.with_reason(e.to_string()),
            _ => ev,
        }
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.slot.is_resolved()
    }

    pub(crate) async fn wait(&self) -> Outcome {
        self.slot.wait().await
    }

    /// Counts one completed poll and returns the new total.
    pub(crate) fn record_poll(&self) -> u32 {
        self.polls.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn polls(&self) -> u32 {
        self.polls.load(Ordering::Acquire)
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }
}

/// Caller-side handle of one acquisition.
///
/// Cheap to clone; all clones observe the same outcome.
#[derive(Clone)]
pub struct OperationHandle {
    op: Arc<Operation>,
}

impl OperationHandle {
    pub(crate) fn new(op: Arc<Operation>) -> Self {
        Self { op }
    }

    /// Operation identifier (use with [`Supervisor::cancel`](crate::Supervisor::cancel)).
    pub fn id(&self) -> OperationId {
        self.op.id
    }

    /// Moment the acquisition started.
    pub fn started_at(&self) -> Instant {
        self.op.started_at
    }

    /// Moment the deadline timer fires.
    pub fn deadline(&self) -> Instant {
        self.op.deadline
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Duration {
        self.op.timeout
    }

    /// Name of the polled source.
    pub fn source_name(&self) -> &str {
        &self.op.source_name
    }

    /// Current status.
    pub fn status(&self) -> Status {
        if self.op.is_resolved() {
            Status::Resolved
        } else {
            Status::Pending
        }
    }

    /// True once the outcome is fixed.
    pub fn is_resolved(&self) -> bool {
        self.op.is_resolved()
    }

    /// Number of polls that returned from the source so far.
    pub fn polls(&self) -> u32 {
        self.op.polls()
    }

    /// The outcome, if already available.
    pub fn outcome(&self) -> Option<Outcome> {
        self.op.slot.get()
    }

    /// Cancels a pending acquisition.
    ///
    /// Returns `true` if this call resolved the operation as
    /// `Cancelled(Caller)`, `false` if it was already resolved (no-op).
    pub fn cancel(&self) -> bool {
        if self.op.is_resolved() {
            return false;
        }
        self.op
            .bus()
            .publish(Event::new(EventKind::CancelRequested).with_op(self.op.id));
        self.op
            .resolve(Outcome::Cancelled(CancelReason::Caller), Resolver::Caller)
    }

    /// Waits for the outcome; returns immediately if already resolved.
    pub async fn wait(&self) -> Outcome {
        self.op.wait().await
    }

    /// Waits for the outcome and converts it into a `Result`.
    pub async fn result(&self) -> Result<Detection, AcquireError> {
        self.wait().await.into_result(self.op.timeout)
    }

    /// Waits until the driver and the timer of this operation have stopped.
    pub async fn released(&self) {
        self.op.released.cancelled().await
    }

    /// True once the background work of this operation has stopped.
    pub fn is_released(&self) -> bool {
        self.op.released.is_cancelled()
    }

    pub(crate) fn operation(&self) -> &Arc<Operation> {
        &self.op
    }
}

impl fmt::Debug for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationHandle")
            .field("id", &self.op.id)
            .field("source", &self.op.source_name)
            .field("status", &self.status())
            .field("polls", &self.polls())
            .finish()
    }
}

/// Cancels the operation when dropped before it resolved.
pub(crate) struct CancelOnDrop<'a>(pub(crate) &'a OperationHandle);

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        if !self.0.is_resolved() {
            self.0.cancel();
        }
    }
}
