//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into the
//! runtime. Each subscriber is driven by a dedicated worker loop fed by a bounded
//! queue owned by the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching); they do **not** block the
//!   resolvers nor other subscribers.
//! - Each subscriber declares its queue capacity via [`Subscribe::queue_capacity`].
//!   On overflow, events for that subscriber are **dropped**.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// # Example
/// ```rust
/// use async_trait::async_trait;
/// use pollvisor::{Event, EventKind, Subscribe};
///
/// struct Audit;
///
/// #[async_trait]
/// impl Subscribe for Audit {
///     async fn on_event(&self, ev: &Event) {
///         if ev.kind == EventKind::DetectionFound {
///             // write audit record...
///         }
///     }
///     fn name(&self) -> &'static str { "audit" }
///     fn queue_capacity(&self) -> usize { 512 }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
