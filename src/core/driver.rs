//! # PollDriver: turns "poll once" into a bounded polling loop.
//!
//! ## Loop
//! ```text
//! acquire permit (optional, cancellable)
//! loop {
//!   ├─► stop cancelled / resolved? ─► exit
//!   ├─► source.poll()  (raced against stop, biased to stop)
//!   ├─► polls += 1     (only once the source answered)
//!   │       ├─ Ok([d1, d2, ..]) ─► resolve Success(d1), discard the rest, exit
//!   │       ├─ Ok([])           ─► publish PollEmpty
//!   │       └─ Err(e)           ─► resolve Error(Source(e)), exit
//!   └─► sleep pacing.next(empty_polls)  (raced against stop)
//! }
//! ```
//!
//! ## Rules
//! - Polls are **sequential**; the next poll starts only after the sleep.
//! - Every iteration sleeps at least [`BackoffPolicy::MIN_DELAY`]; the loop never spins.
//! - Once the operation is resolved, no new poll is launched. A poll in flight
//!   at that moment is dropped and its result never reaches the caller.

use std::sync::Arc;

use tokio::{sync::Semaphore, time};

use crate::{
    core::operation::{Operation, Resolver},
    error::AcquireError,
    events::{Event, EventKind},
    outcome::Outcome,
    policies::BackoffPolicy,
    source::SourceRef,
};

/// Polling loop of one operation.
pub(crate) struct PollDriver {
    op: Arc<Operation>,
    source: SourceRef,
    pacing: BackoffPolicy,
    semaphore: Option<Arc<Semaphore>>,
}

impl PollDriver {
    pub(crate) fn new(
        op: Arc<Operation>,
        source: SourceRef,
        pacing: BackoffPolicy,
        semaphore: Option<Arc<Semaphore>>,
    ) -> Self {
        Self {
            op,
            source,
            pacing,
            semaphore,
        }
    }

    /// Runs until the operation is resolved or stopped.
    pub(crate) async fn run(self) {
        let stop = self.op.stop.clone();

        let _permit = match &self.semaphore {
            Some(sem) => {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => return,
                    res = Arc::clone(sem).acquire_owned() => match res {
                        Ok(permit) => Some(permit),
                        // Closed only during shutdown; the supervising task resolves.
                        Err(_closed) => return,
                    }
                }
            }
            None => None,
        };

        let mut empty_polls: u32 = 0;
        loop {
            if stop.is_cancelled() || self.op.is_resolved() {
                break;
            }

            let (polls, res) = tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                res = self.source.poll() => (self.op.record_poll(), res),
            };

            match res {
                Ok(batch) if !batch.is_empty() => {
                    let discarded = batch.len() - 1;
                    if let Some(first) = batch.into_iter().next() {
                        let event = Event::new(EventKind::DetectionFound)
                            .with_op(self.op.id)
                            .with_source(self.source.name())
                            .with_polls(polls)
                            .with_discarded(discarded);
                        self.op
                            .resolve_with(Outcome::Success(first), Resolver::Driver, event);
                    }
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    let event = Event::new(EventKind::SourceFailed)
                        .with_op(self.op.id)
                        .with_source(self.source.name())
                        .with_polls(polls)
                        .with_reason(e.to_string());
                    self.op.resolve_with(
                        Outcome::Error(AcquireError::from_source(e)),
                        Resolver::Driver,
                        event,
                    );
                    break;
                }
            }

            let delay = self.pacing.next(empty_polls);
            empty_polls = empty_polls.saturating_add(1);
            self.op.bus().publish(
                Event::new(EventKind::PollEmpty)
                    .with_op(self.op.id)
                    .with_source(self.source.name())
                    .with_polls(polls)
                    .with_delay(delay),
            );

            tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                _ = time::sleep(delay) => {}
            }
        }
    }
}
