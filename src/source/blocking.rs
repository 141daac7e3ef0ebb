//! # Blocking source adapter.
//!
//! Hardware SDKs usually expose a synchronous "inventory now" call.
//! [`BlockingSource`] runs such a call on tokio's blocking pool so the poll
//! driver, the deadline timer and the caller never share a thread with it.
//!
//! If the acquisition resolves while a blocking call is in flight, the call is
//! not interrupted; it runs to completion on its thread and the result is
//! discarded.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::source::{Detection, Source};

/// Source backed by a blocking function.
///
/// # Example
/// ```
/// use pollvisor::{BlockingSource, Detection, SourceRef};
///
/// let reader: SourceRef = BlockingSource::arc("uhf-reader", || {
///     // reader.inventory_real_time()
///     Ok(vec![Detection::new([0xE2, 0x80, 0x11, 0x60])])
/// });
/// assert_eq!(reader.name(), "uhf-reader");
/// ```
pub struct BlockingSource<F> {
    name: Cow<'static, str>,
    f: Arc<F>,
}

impl<F> BlockingSource<F>
where
    F: Fn() -> Result<Vec<Detection>, SourceError> + Send + Sync + 'static,
{
    /// Creates a new blocking source.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    /// Creates the source and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F> Source for BlockingSource<F>
where
    F: Fn() -> Result<Vec<Detection>, SourceError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&self) -> Result<Vec<Detection>, SourceError> {
        let f = Arc::clone(&self.f);
        match tokio::task::spawn_blocking(move || f()).await {
            Ok(res) => res,
            Err(join) => Err(SourceError::with_cause("blocking poll did not complete", join)),
        }
    }
}
