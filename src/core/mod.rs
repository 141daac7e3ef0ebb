//! Runtime core: acquisitions and their lifecycle.
//!
//! The public API from this module is [`Supervisor`] (built via
//! [`SupervisorBuilder`]), the per-call [`AcquireSpec`], the runtime
//! [`Config`] and the caller-side [`OperationHandle`].
//!
//! Internal modules:
//! - [`operation`]: shared state of one acquisition and its handle;
//! - [`driver`]: the polling loop;
//! - [`timer`]: the deadline timer;
//! - [`registry`]: in-flight operations, cancel by id, drain on shutdown;
//! - [`supervisor`]: wiring, start/acquire, shutdown;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod config;
mod driver;
mod operation;
mod registry;
mod shutdown;
mod spec;
mod supervisor;
mod timer;

pub use builder::SupervisorBuilder;
pub use config::Config;
pub use operation::{OperationHandle, OperationId, Status};
pub use spec::AcquireSpec;
pub use supervisor::Supervisor;
