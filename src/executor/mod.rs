//! Execution lanes and their supporting types.
//!
//! This module provides the worker-pool and UI-lane primitives the
//! dispatcher routes work onto, plus the thread factory that names and
//! prioritizes every thread the crate creates.

pub mod factory;
pub mod pool;
pub mod task;
pub mod ui;

pub use factory::{ThreadFactory, ThreadPriority};
pub use pool::{RejectedJob, WorkerPool};
pub use task::Task;
pub use ui::{UiDriver, UiLane};

/// A unit of work accepted by every lane.
pub type Job = Box<dyn FnOnce() + Send + 'static>;
