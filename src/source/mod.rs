//! # Polling sources and the detections they produce.
//!
//! This module provides the source-related types:
//! - [`Source`] - trait for a pollable producer of detections
//! - [`SourceFn`] - async closure-backed source
//! - [`BlockingSource`] - adapter for blocking driver calls (runs on the blocking pool)
//! - [`SourceRef`] - shared reference to a source (`Arc<dyn Source>`)
//! - [`Detection`] - one opaque sighting

mod blocking;
mod detection;
mod source_fn;
mod source;

pub use blocking::BlockingSource;
pub use detection::Detection;
pub use source::{Source, SourceRef};
pub use source_fn::SourceFn;
