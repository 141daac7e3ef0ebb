//! # Function-backed source (`SourceFn`)
//!
//! [`SourceFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! poll. Shared state between polls must be captured explicitly (`Arc<...>`).
//!
//! ## Example
//! ```rust
//! use pollvisor::{Detection, SourceFn, SourceRef, SourceError};
//!
//! let src: SourceRef = SourceFn::arc("always-empty", || async {
//!     Ok::<_, SourceError>(Vec::<Detection>::new())
//! });
//!
//! assert_eq!(src.name(), "always-empty");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::source::{Detection, Source};

/// Closure-backed source implementation.
#[derive(Debug)]
pub struct SourceFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SourceFn<F> {
    /// Creates a new function-backed source.
    ///
    /// Prefer [`SourceFn::arc`] when you immediately need a [`SourceRef`](crate::SourceRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the source and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Source for SourceFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<Detection>, SourceError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&self) -> Result<Vec<Detection>, SourceError> {
        (self.f)().await
    }
}
