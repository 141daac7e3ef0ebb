//! # Source abstraction.
//!
//! A [`Source`] is polled repeatedly by the poll driver. Each call returns the
//! detections currently visible (possibly none) or a [`SourceError`].
//!
//! Sources are opened and closed by the application; the supervisor only
//! borrows an already-initialized one. One physical device should not be
//! polled by two acquisitions at once unless the driver allows it; either
//! serialize acquisitions yourself or set
//! [`Config::max_concurrent`](crate::Config::max_concurrent) to `1`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::source::Detection;

/// # Pollable producer of detections.
///
/// `poll` may take a while (bounded latency) and is never called concurrently
/// by one acquisition. The future may be dropped mid-flight when the
/// acquisition resolves for another reason.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use pollvisor::{Detection, Source, SourceError};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl Source for Fixed {
///     fn name(&self) -> &str { "fixed" }
///
///     async fn poll(&self) -> Result<Vec<Detection>, SourceError> {
///         Ok(vec![Detection::new([0xE2, 0x00])])
///     }
/// }
/// ```
#[async_trait]
pub trait Source: Send + Sync + 'static {
    /// Returns a stable, human-readable source name.
    fn name(&self) -> &str;

    /// Performs one poll.
    ///
    /// Returns the detections in the order the device reported them.
    async fn poll(&self) -> Result<Vec<Detection>, SourceError>;
}

/// Shared handle to a source.
pub type SourceRef = Arc<dyn Source>;
