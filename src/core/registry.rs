//! # Registry of in-flight operations.
//!
//! The registry owns the background work of every started operation:
//! - `spawn(handle, driver)` registers the handle and spawns its supervising task
//! - `cancel(id)` resolves a pending operation as `Cancelled(Caller)`
//! - `close_and_wait(grace)` drains everything on shutdown
//!
//! ## Supervising task (one per operation)
//! ```text
//! spawn driver ─┐
//! spawn timer  ─┤
//!               ▼
//! select! ─┬─ outcome resolved         ─► cleanup
//!          ├─ driver ended / panicked  ─► resolve Error(Source) on panic ─► cleanup
//!          └─ runtime token cancelled  ─► resolve Cancelled(Shutdown)   ─► cleanup
//!
//! cleanup: stop.cancel() → abort + join timer → join driver
//!          → remove from map → publish OperationReleased → released.cancel()
//! ```
//!
//! ## Rules
//! - An operation stays in the map until its driver and timer are joined.
//! - Every supervising task is tracked, so shutdown can wait for all of them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    core::{
        driver::PollDriver,
        operation::{Operation, OperationHandle, OperationId, Resolver},
        timer,
    },
    error::{AcquireError, SourceError},
    events::{Bus, Event, EventKind},
    outcome::{CancelReason, Outcome},
};

/// Event-driven registry of in-flight operations.
pub(crate) struct Registry {
    ops: RwLock<HashMap<OperationId, OperationHandle>>,
    tracker: TaskTracker,
    bus: Bus,
    runtime_token: CancellationToken,
}

impl Registry {
    pub(crate) fn new(bus: Bus, runtime_token: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            ops: RwLock::new(HashMap::new()),
            tracker: TaskTracker::new(),
            bus,
            runtime_token,
        })
    }

    /// Registers `handle` and starts its driver and timer.
    pub(crate) async fn spawn(self: &Arc<Self>, handle: OperationHandle, driver: PollDriver) {
        let op = Arc::clone(handle.operation());
        self.ops.write().await.insert(op.id, handle);

        let me = Arc::clone(self);
        self.tracker.spawn(async move { me.supervise(op, driver).await });
    }

    async fn supervise(&self, op: Arc<Operation>, driver: PollDriver) {
        let mut driver = tokio::spawn(driver.run());
        let timer = tokio::spawn(timer::run_deadline(Arc::clone(&op)));

        let mut driver_joined = false;
        tokio::select! {
            _ = op.wait() => {}
            res = &mut driver => {
                driver_joined = true;
                if let Err(join) = res {
                    let error = SourceError::with_cause("poll driver terminated abnormally", join);
                    let event = Event::new(EventKind::SourceFailed)
                        .with_op(op.id)
                        .with_source(Arc::clone(&op.source_name))
                        .with_polls(op.polls())
                        .with_reason(error.to_string());
                    op.resolve_with(
                        Outcome::Error(AcquireError::from_source(error)),
                        Resolver::Supervisor,
                        event,
                    );
                }
            }
            _ = self.runtime_token.cancelled() => {
                op.resolve(Outcome::Cancelled(CancelReason::Shutdown), Resolver::Shutdown);
            }
        }

        // The driver may have returned because the runtime stopped it first.
        if !op.is_resolved() && self.runtime_token.is_cancelled() {
            op.resolve(Outcome::Cancelled(CancelReason::Shutdown), Resolver::Shutdown);
        }
        let outcome = op.wait().await;

        op.stop.cancel();
        timer.abort();
        let _ = timer.await;
        if !driver_joined {
            let _ = driver.await;
        }

        self.ops.write().await.remove(&op.id);
        self.bus.publish(
            Event::new(EventKind::OperationReleased)
                .with_op(op.id)
                .with_polls(op.polls())
                .with_reason(outcome.as_label()),
        );
        op.released.cancel();
    }

    /// Cancels a pending operation by id.
    ///
    /// Returns `false` if the id is unknown or the operation already resolved.
    pub(crate) async fn cancel(&self, id: OperationId) -> bool {
        let handle = self.ops.read().await.get(&id).cloned();
        match handle {
            Some(h) => h.cancel(),
            None => false,
        }
    }

    /// Returns the handle of an in-flight operation.
    pub(crate) async fn get(&self, id: OperationId) -> Option<OperationHandle> {
        self.ops.read().await.get(&id).cloned()
    }

    /// Sorted ids of operations that are still pending.
    pub(crate) async fn pending(&self) -> Vec<OperationId> {
        let ops = self.ops.read().await;
        let mut ids: Vec<OperationId> = ops
            .values()
            .filter(|h| !h.is_resolved())
            .map(|h| h.id())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Sorted ids of operations whose background work has not stopped yet.
    pub(crate) async fn in_flight(&self) -> Vec<OperationId> {
        let mut ids: Vec<OperationId> = self.ops.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Stops accepting tracked work and waits up to `grace` for it to finish.
    ///
    /// Returns the ids still in flight when the grace period ran out.
    pub(crate) async fn close_and_wait(&self, grace: Duration) -> Result<(), Vec<OperationId>> {
        self.tracker.close();
        match tokio::time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => Ok(()),
            Err(_elapsed) => Err(self.in_flight().await),
        }
    }
}
