//! Poll pacing policies.
//!
//! These knobs control **how long** the poll driver sleeps after an empty poll.
//!
//! ## Contents
//! - [`BackoffPolicy`] how the inter-poll delay evolves (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization so several readers do not poll in lockstep
//!
//! ## Quick wiring
//! ```text
//! AcquireSpec { pacing: BackoffPolicy, timeout: Duration }
//!      └─► core::driver::PollDriver uses:
//!           - pacing.next(empty_polls) to sleep between polls
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::constant(interval)` → first=max=interval, factor=1.0, jitter=None.
//! - `JitterPolicy::None` by default.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
