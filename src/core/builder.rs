use std::sync::Arc;
use tokio::sync;

use crate::{
    core::Config,
    events::Bus,
    source::SourceRef,
    subscribers::{Subscribe, SubscriberSet},
};

use super::supervisor::Supervisor;

/// Builder for constructing a Supervisor with optional features.
pub struct SupervisorBuilder {
    cfg: Config,
    source: Option<SourceRef>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            source: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the source every acquisition polls.
    ///
    /// Without a source, every acquisition resolves as
    /// [`AcquireError::NotInitialized`](crate::AcquireError::NotInitialized)
    /// and nothing is polled.
    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (acquisition lifecycle, polls,
    /// failures) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds and returns the Supervisor instance.
    ///
    /// Must be called inside a tokio runtime: subscriber workers and the
    /// event listener are spawned here.
    pub fn build(self) -> Arc<Supervisor> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());

        let semaphore = self
            .cfg
            .concurrency_limit()
            .map(sync::Semaphore::new)
            .map(Arc::new);

        Arc::new(Supervisor::new_internal(
            self.cfg,
            self.source,
            bus,
            subs,
            semaphore,
        ))
    }
}
