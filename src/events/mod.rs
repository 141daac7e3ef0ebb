//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: operation resolvers (`PollDriver`, deadline timer, cancel,
//!   shutdown), the per-operation supervising task, `SubscriberSet` workers.
//! - **Consumers**: the supervisor's listener task (fans out to `SubscriberSet`, drained on shutdown).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
