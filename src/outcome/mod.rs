//! Terminal results and the single-delivery slot that carries them.
//!
//! ## Contents
//! - [`Outcome`] the one terminal result of an acquisition
//! - [`CancelReason`] who cancelled (caller or supervisor shutdown)
//! - [`OutcomeSlot`] first-writer-wins slot with race-free waiting

mod kind;
mod slot;

pub use kind::{CancelReason, Outcome};
pub use slot::OutcomeSlot;
