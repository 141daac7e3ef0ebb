//! # Deadline timer.
//!
//! One timer task per operation races the poll driver:
//! ```text
//! select! (biased)
//!   ├─ stop.cancelled()      → exit, sleep dropped (another resolver won)
//!   └─ sleep_until(deadline) → resolve(Timeout)
//! ```
//! The supervising task also aborts and joins the timer during cleanup, so no
//! timer outlives its operation.

use std::sync::Arc;

use tokio::time;

use crate::core::operation::{Operation, Resolver};
use crate::outcome::Outcome;

/// Runs the deadline timer of `op` until it fires or the operation stops.
pub(crate) async fn run_deadline(op: Arc<Operation>) {
    tokio::select! {
        biased;
        _ = op.stop.cancelled() => {}
        _ = time::sleep_until(op.deadline) => {
            op.resolve(Outcome::Timeout, Resolver::Timer);
        }
    }
}
