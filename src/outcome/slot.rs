//! # Single-delivery outcome slot.
//!
//! [`OutcomeSlot`] arbitrates between competing resolvers (poll driver, deadline
//! timer, caller cancel, supervisor shutdown). The first call to
//! [`OutcomeSlot::resolve`] wins; every later call is a silent no-op.
//!
//! ## Architecture
//! ```text
//! driver ──┐
//! timer  ──┼──► resolve(outcome) ──► CAS resolved: false → true
//! cancel ──┤                             │ won            │ lost
//! shutdown ┘                             ▼                ▼
//!                              watch::send_replace   return false
//!                                        │
//!                               wait() ◄─┘  (wait_for checks current value first)
//! ```
//!
//! ## Rules
//! - Resolution is decided by the compare-and-set alone (linearizable).
//! - `wait()` is safe before and after resolution; no notification can be missed.
//! - [`OutcomeSlot::is_resolved`] may turn `true` an instant before
//!   [`OutcomeSlot::get`] returns `Some`; `wait()` covers that gap.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use super::{CancelReason, Outcome};

/// First-writer-wins slot holding the outcome of one operation.
#[derive(Debug)]
pub struct OutcomeSlot {
    resolved: AtomicBool,
    tx: watch::Sender<Option<Outcome>>,
}

impl Default for OutcomeSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeSlot {
    /// Creates an empty (pending) slot.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            resolved: AtomicBool::new(false),
            tx,
        }
    }

    /// Attempts to resolve the slot.
    ///
    /// Returns `true` if this call won the race, `false` if the slot was already
    /// resolved (the outcome passed in is dropped).
    pub fn resolve(&self, outcome: Outcome) -> bool {
        if self
            .resolved
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.tx.send_replace(Some(outcome));
        true
    }

    /// Returns `true` once a resolver has won.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }

    /// Returns the outcome if it is already published.
    pub fn get(&self) -> Option<Outcome> {
        self.tx.borrow().clone()
    }

    /// Waits for the outcome.
    ///
    /// Returns immediately if the slot is already resolved.
    pub async fn wait(&self) -> Outcome {
        let mut rx = self.tx.subscribe();
        let published = match rx.wait_for(Option::is_some).await {
            Ok(value) => value.clone(),
            Err(_closed) => None,
        };
        // The sender lives in `self`, so the channel cannot close while we borrow it.
        published.unwrap_or(Outcome::Cancelled(CancelReason::Shutdown))
    }
}
