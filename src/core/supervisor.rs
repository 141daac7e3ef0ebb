//! # Supervisor: starts acquisitions, arbitrates their outcome, shuts down.
//!
//! The [`Supervisor`] owns the source, the event bus, a [`SubscriberSet`] and
//! the registry of in-flight operations.
//!
//! ## Key responsibilities
//! - validate an [`AcquireSpec`] and start one poll driver + one deadline timer
//! - fail fast with `NotInitialized` when no source was supplied
//! - cancel operations by id
//! - subscribe to the [`Bus`] and **fan-out** events via [`SubscriberSet`]
//! - graceful shutdown with a configurable [`Config::grace`]
//!
//! ## High-level architecture
//! ```text
//! start(spec):
//!   validate ──► id = next_id ──► Operation { deadline = now + timeout, slot }
//!                                        │
//!        no source? ──► resolve Error(NotInitialized), no background work
//!                                        │
//!                                        ▼
//!                   Registry::spawn ──► supervising task
//!                                          ├─► PollDriver::run   (polls, sleeps)
//!                                          └─► run_deadline      (sleep_until)
//!
//! resolvers:  driver / timer / cancel(id) / shutdown ──► Operation::resolve (CAS)
//!
//! shutdown():
//!   publish ShutdownRequested ─► runtime_token.cancel() ─► close semaphore
//!   └─► wait up to grace ─┬─ all released  → AllStoppedWithin
//!                         └─ grace exceeded → GraceExceeded + RuntimeError
//!   └─► stop listener ─► forward queued events ─► drain subscriber workers
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use pollvisor::{AcquireSpec, Config, Detection, SourceError, SourceFn, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let reader = SourceFn::arc("reader", || async {
//!         Ok::<_, SourceError>(vec![Detection::new([0xE2, 0x00, 0x68, 0x10])])
//!     });
//!
//!     let sup = Supervisor::builder(Config::default())
//!         .with_source(reader)
//!         .build();
//!
//!     let spec = AcquireSpec::new(Duration::from_millis(100), Duration::from_secs(10));
//!     let tag = sup.acquire(spec).await.into_hex(spec.timeout());
//!     assert_eq!(tag.unwrap(), "E2006810");
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore, broadcast};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::Config,
        driver::PollDriver,
        operation::{CancelOnDrop, Operation, OperationHandle, OperationId, Resolver},
        registry::Registry,
        shutdown,
        spec::AcquireSpec,
    },
    error::{AcquireError, RuntimeError},
    events::{Bus, Event, EventKind},
    outcome::{CancelReason, Outcome},
    source::SourceRef,
    subscribers::SubscriberSet,
};

use super::builder::SupervisorBuilder;

/// Name reported for operations started without a source.
const NO_SOURCE: &str = "<none>";

/// Coordinates acquisitions against one source.
pub struct Supervisor {
    cfg: Config,
    source: Option<SourceRef>,
    bus: Bus,
    listener: Mutex<Option<JoinHandle<()>>>,
    registry: Arc<Registry>,
    semaphore: Option<Arc<Semaphore>>,
    runtime_token: CancellationToken,
    listener_token: CancellationToken,
    next_id: AtomicU64,
}

impl Supervisor {
    /// Creates a builder with the given configuration.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        source: Option<SourceRef>,
        bus: Bus,
        subs: SubscriberSet,
        semaphore: Option<Arc<Semaphore>>,
    ) -> Self {
        let runtime_token = CancellationToken::new();
        let listener_token = CancellationToken::new();
        let registry = Registry::new(bus.clone(), runtime_token.clone());
        let listener = if subs.is_empty() {
            None
        } else {
            Some(subscriber_listener(
                bus.subscribe(),
                subs,
                listener_token.clone(),
            ))
        };
        Self {
            cfg,
            source,
            bus,
            listener: Mutex::new(listener),
            registry,
            semaphore,
            runtime_token,
            listener_token,
            next_id: AtomicU64::new(1),
        }
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Event bus; subscribe to observe the raw event stream.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Starts an acquisition and returns its handle immediately.
    ///
    /// ### Errors
    /// [`AcquireError::InvalidSpec`] if the poll interval or the timeout is zero.
    /// Every other failure is delivered through the handle's outcome.
    pub async fn start(&self, spec: AcquireSpec) -> Result<OperationHandle, AcquireError> {
        spec.validate()?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let source_name: Arc<str> = match &self.source {
            Some(src) => Arc::from(src.name()),
            None => Arc::from(NO_SOURCE),
        };
        let op = Operation::new(
            id,
            source_name,
            &spec,
            self.runtime_token.child_token(),
            self.bus.clone(),
        );
        let handle = OperationHandle::new(Arc::clone(&op));

        self.bus.publish(
            Event::new(EventKind::AcquireStarted)
                .with_op(id)
                .with_source(Arc::clone(&op.source_name))
                .with_timeout(spec.timeout())
                .with_delay(spec.poll_interval()),
        );

        let source = match &self.source {
            Some(src) if !self.runtime_token.is_cancelled() => Arc::clone(src),
            Some(_) => {
                op.resolve(Outcome::Cancelled(CancelReason::Shutdown), Resolver::Shutdown);
                op.released.cancel();
                return Ok(handle);
            }
            None => {
                op.resolve(Outcome::Error(AcquireError::NotInitialized), Resolver::Supervisor);
                op.released.cancel();
                return Ok(handle);
            }
        };

        let driver = PollDriver::new(
            Arc::clone(&op),
            source,
            spec.pacing(),
            self.semaphore.clone(),
        );
        self.registry.spawn(handle.clone(), driver).await;
        Ok(handle)
    }

    /// Runs one acquisition to completion.
    ///
    /// Returns after the outcome is fixed **and** the driver and timer have
    /// stopped. Dropping the returned future cancels a still-pending acquisition.
    /// An invalid spec is reported as `Outcome::Error(InvalidSpec)`.
    pub async fn acquire(&self, spec: AcquireSpec) -> Outcome {
        let handle = match self.start(spec).await {
            Ok(h) => h,
            Err(e) => return Outcome::Error(e),
        };
        let _guard = CancelOnDrop(&handle);

        let outcome = handle.wait().await;
        handle.released().await;
        outcome
    }

    /// Cancels a pending acquisition by id.
    ///
    /// Returns `true` if this call resolved it as cancelled; `false` if the id is
    /// unknown, already resolved, or already released (idempotent).
    pub async fn cancel(&self, id: OperationId) -> bool {
        self.registry.cancel(id).await
    }

    /// Returns the handle of an operation that is still in flight.
    pub async fn handle(&self, id: OperationId) -> Option<OperationHandle> {
        self.registry.get(id).await
    }

    /// Returns true if the operation is in flight and not yet resolved.
    pub async fn is_pending(&self, id: OperationId) -> bool {
        self.registry
            .get(id)
            .await
            .is_some_and(|h| !h.is_resolved())
    }

    /// Sorted ids of pending operations.
    pub async fn list_pending(&self) -> Vec<OperationId> {
        self.registry.pending().await
    }

    /// Resolves every pending operation as interrupted and waits for cleanup.
    ///
    /// New acquisitions started afterwards resolve immediately as
    /// `Cancelled(Shutdown)`. Before returning, every event published so far
    /// (including the final `AllStoppedWithin` / `GraceExceeded`) has been
    /// handed to the subscribers, within another [`Config::grace`].
    ///
    /// ### Errors
    /// [`RuntimeError::GraceExceeded`] if background work did not stop within
    /// [`Config::grace`] (typically a source stuck in a blocking call).
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.runtime_token.cancel();
        if let Some(sem) = &self.semaphore {
            sem.close();
        }

        let grace = self.cfg.grace;
        let res = match self.registry.close_and_wait(grace).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(stuck) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        };
        self.flush_subscribers(grace).await;
        res
    }

    /// Stops the listener and waits for subscriber workers to drain.
    async fn flush_subscribers(&self, grace: Duration) {
        self.listener_token.cancel();
        let Some(listener) = self.listener.lock().await.take() else {
            return;
        };
        if time::timeout(grace, listener).await.is_err() {
            tracing::warn!(?grace, "subscribers did not drain in time");
        }
    }

    /// True once [`Supervisor::shutdown`] was called.
    pub fn is_shut_down(&self) -> bool {
        self.runtime_token.is_cancelled()
    }

    /// Spawns a task that calls [`Supervisor::shutdown`] on SIGINT/SIGTERM/SIGQUIT
    /// (Ctrl-C on other platforms).
    pub fn shutdown_on_signal(self: &Arc<Self>) -> JoinHandle<Result<(), RuntimeError>> {
        let me = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                res = shutdown::wait_for_shutdown_signal() => match res {
                    Ok(()) => me.shutdown().await,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to install signal handlers");
                        Ok(())
                    }
                },
                _ = me.runtime_token.cancelled() => Ok(()),
            }
        })
    }
}

/// Forwards bus events to the subscriber set until `stop` fires.
///
/// On stop, events already queued on the bus are still forwarded, then the
/// set is shut down so its workers finish their queues.
fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    stop: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "event listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = stop.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(ev) => set.emit(&ev),
                            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                                tracing::warn!(skipped = n, "event listener lagged");
                            }
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    })
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.listener_token.cancel();
    }
}
