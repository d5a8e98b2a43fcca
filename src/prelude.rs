//! Convenience re-exports for the common surface.

pub use crate::config::{PoolConfig, PoolConfigBuilder, SaturationPolicy};
pub use crate::dispatcher::{Dispatcher, Lane};
pub use crate::error::{Error, Result};
pub use crate::executor::{Task, ThreadFactory, ThreadPriority, UiDriver, UiLane, WorkerPool};
