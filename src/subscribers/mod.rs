//! # Event subscribers for the pollvisor runtime.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   resolvers ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet::emit
//!                                                                      │
//!                                                         ┌────────────┼───────────┐
//!                                                         ▼            ▼           ▼
//!                                                     LogWriter     Metrics     Custom
//! ```
//!
//! ## Contents
//! - [`Subscribe`] the trait to implement
//! - [`SubscriberSet`] fan-out with per-subscriber queues
//! - [`LogWriter`] built-in `tracing` forwarder (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
