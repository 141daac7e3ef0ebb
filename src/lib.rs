//! # pollvisor
//!
//! **Pollvisor** supervises cancellable single-result acquisitions against a
//! polled source, such as an RFID reader that is asked "any tag in range?"
//! until one answers.
//!
//! Each acquisition polls the source at a fixed pace (or a backoff schedule)
//! until the first detection arrives, a deadline passes, the caller cancels,
//! or the supervisor shuts down. Exactly one of these wins and is delivered
//! exactly once; losers are ignored and reported on the event bus.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     acquire(spec) / start(spec)          cancel(id)        shutdown()
//!            │                                  │                 │
//!            ▼                                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - Source (one per supervisor; missing → NotInitialized)          │
//! │  - Registry (in-flight operations by id)                          │
//! │  - Bus (broadcast events) + SubscriberSet (per-sub queues)        │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        ▼ one supervising task per operation
//!     ┌──────────────┐        ┌──────────────┐
//!     │  PollDriver  │        │ deadline     │
//!     │ poll / sleep │        │ timer        │
//!     └──────┬───────┘        └──────┬───────┘
//!            │ Success / Error       │ Timeout
//!            ▼                       ▼
//!     ┌───────────────────────────────────────┐
//!     │ OutcomeSlot (first writer wins, once) │ ◄── Cancelled(Caller / Shutdown)
//!     └───────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! start ──► publish AcquireStarted
//! loop {
//!   ├─► stop cancelled or resolved? ─► exit
//!   ├─► poll source
//!   │     ├─ [d1, ..] ─► resolve Success(d1)    ─► DetectionFound
//!   │     ├─ []       ─► PollEmpty, sleep interval
//!   │     └─ Err(e)   ─► resolve Error(Source)  ─► SourceFailed
//! }
//! deadline  ─► resolve Timeout               ─► TimeoutHit
//! cancel    ─► resolve Cancelled(Caller)     ─► AcquireCancelled
//! shutdown  ─► resolve Cancelled(Shutdown)   ─► AcquireInterrupted
//!
//! cleanup: driver + timer joined ─► OperationReleased
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                             |
//! |-------------------|-------------------------------------------------------------|------------------------------------------------|
//! | **Sources**       | Anything that can be polled for detections.                 | [`Source`], [`SourceFn`], [`BlockingSource`]   |
//! | **Supervision**   | Start, await, cancel, list and shut down acquisitions.      | [`Supervisor`], [`OperationHandle`]            |
//! | **Outcomes**      | One terminal result per acquisition, delivered once.        | [`Outcome`], [`OutcomeSlot`]                   |
//! | **Policies**      | Poll pacing: constant interval, backoff, jitter.            | [`BackoffPolicy`], [`JitterPolicy`]            |
//! | **Subscriber API**| Hook into acquisition events (logging, metrics, custom).    | [`Subscribe`]                                  |
//! | **Errors**        | Typed errors for acquisitions and the runtime.              | [`AcquireError`], [`RuntimeError`]             |
//! | **Configuration** | Runtime defaults and limits.                                | [`Config`], [`AcquireSpec`]                    |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], forwarding events to `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//! use pollvisor::{AcquireSpec, Config, Detection, Outcome, SourceError, SourceFn, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // A reader that sees a tag on its third inventory round.
//!     let rounds = Arc::new(AtomicU32::new(0));
//!     let reader = SourceFn::arc("reader", move || {
//!         let n = rounds.fetch_add(1, Ordering::SeqCst);
//!         async move {
//!             if n < 2 {
//!                 Ok::<Vec<Detection>, SourceError>(Vec::new())
//!             } else {
//!                 Ok(vec![Detection::new([0xE2, 0x80, 0x11, 0x60])])
//!             }
//!         }
//!     });
//!
//!     let sup = Supervisor::builder(Config::default())
//!         .with_source(reader)
//!         .build();
//!
//!     let spec = AcquireSpec::new(Duration::from_millis(10), Duration::from_secs(1));
//!     match sup.acquire(spec).await {
//!         Outcome::Success(tag) => assert_eq!(tag.to_hex(), "E2801160"),
//!         other => panic!("no tag: {}", other.as_label()),
//!     }
//! }
//! ```
mod core;
mod error;
mod events;
mod outcome;
mod policies;
mod source;
mod subscribers;

// ---- Public re-exports ----

pub use core::{AcquireSpec, Config, OperationHandle, OperationId, Status, Supervisor, SupervisorBuilder};
pub use error::{AcquireError, BoxError, RuntimeError, SourceError};
pub use events::{Bus, Event, EventKind};
pub use outcome::{CancelReason, Outcome, OutcomeSlot};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use source::{BlockingSource, Detection, Source, SourceFn, SourceRef};
pub use subscribers::{Subscribe, SubscriberSet};

// Built-in tracing subscriber.
// Disable with: `--no-default-features`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
