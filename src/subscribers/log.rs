//! # LogWriter: events to `tracing`
//!
//! A subscriber that forwards every [`Event`] to the `tracing` ecosystem under
//! the `pollvisor` target. Install any `tracing` subscriber (for example
//! `tracing_subscriber::fmt`) to see the output.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO  pollvisor: acquire started op=1 source="uhf-reader" timeout_ms=10000 interval_ms=100
//! DEBUG pollvisor: poll empty op=1 polls=3 delay_ms=100
//! INFO  pollvisor: detection found op=1 polls=6 discarded=0
//! DEBUG pollvisor: operation released op=1 polls=6 outcome="success"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let op = e.op.unwrap_or_default();
        let source = e.source.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::AcquireStarted => tracing::info!(
                target: "pollvisor", op, source, timeout_ms = e.timeout_ms, interval_ms = e.delay_ms,
                "acquire started"
            ),
            EventKind::PollEmpty => tracing::debug!(
                target: "pollvisor", op, polls = e.polls, delay_ms = e.delay_ms,
                "poll empty"
            ),
            EventKind::DetectionFound => tracing::info!(
                target: "pollvisor", op, polls = e.polls, discarded = e.discarded,
                "detection found"
            ),
            EventKind::TimeoutHit => tracing::info!(
                target: "pollvisor", op, timeout_ms = e.timeout_ms,
                "acquire timed out"
            ),
            EventKind::CancelRequested => {
                tracing::debug!(target: "pollvisor", op, "cancel requested")
            }
            EventKind::AcquireCancelled => {
                tracing::info!(target: "pollvisor", op, "acquire cancelled")
            }
            EventKind::AcquireInterrupted => {
                tracing::warn!(target: "pollvisor", op, "acquire interrupted by shutdown")
            }
            EventKind::SourceFailed => tracing::warn!(
                target: "pollvisor", op, source, polls = e.polls, reason,
                "source failed"
            ),
            EventKind::SourceMissing => {
                tracing::warn!(target: "pollvisor", op, "source not initialized")
            }
            EventKind::LateResolveIgnored => {
                tracing::trace!(target: "pollvisor", op, resolver = reason, "late resolve ignored")
            }
            EventKind::OperationReleased => tracing::debug!(
                target: "pollvisor", op, polls = e.polls, outcome = reason,
                "operation released"
            ),
            EventKind::ShutdownRequested => {
                tracing::info!(target: "pollvisor", "shutdown requested")
            }
            EventKind::AllStoppedWithin => {
                tracing::info!(target: "pollvisor", "all operations stopped within grace")
            }
            EventKind::GraceExceeded => {
                tracing::warn!(target: "pollvisor", "shutdown grace exceeded")
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "pollvisor", subscriber = source, reason, "subscriber overflow")
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(target: "pollvisor", subscriber = source, reason, "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
