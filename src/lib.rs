//! TRILANE - fixed three-lane task dispatcher
//!
//! A small facade that routes units of work onto one of three fixed
//! execution contexts - a single-threaded disk/IO lane, a bounded
//! multi-worker compute lane, and a single logical UI lane - and marshals
//! task results (or failures) back to the UI lane.
//!
//! # Quick Start
//!
//! ```no_run
//! use trilane::{Dispatcher, Lane};
//!
//! let dispatcher = Dispatcher::global();
//!
//! // fire-and-forget on the compute pool, explicit UI redispatch
//! dispatcher
//!     .dispatch(Lane::Compute, {
//!         let dispatcher = dispatcher.clone();
//!         move || {
//!             let n = (0u64..1_000_000).sum::<u64>();
//!             let _ = dispatcher.run_on_ui(move || println!("sum: {n}"));
//!         }
//!     })
//!     .unwrap();
//! ```
//!
//! # Features
//!
//! - **Three fixed lanes**: serial IO, elastic bounded compute, FIFO UI
//! - **Two-phase tasks**: background `produce`, UI-delivered completion
//! - **Blocking bridge**: `submit` waits for the worker result on the
//!   calling thread, then redispatches to the UI lane
//! - **Deterministic threads**: named, priority-tagged workers
//! - **Explicit saturation policy**: reject, block, or drop per lane
//!
//! This is not a general-purpose async runtime: there is no cancellation
//! propagation, no task chaining, no work-stealing. The dispatcher stays a
//! fixed three-lane facade on purpose.

// Lint configuration
#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod prelude;

// Re-export key types at crate root
pub use config::{PoolConfig, PoolConfigBuilder, SaturationPolicy};
pub use dispatcher::{Dispatcher, Lane};
pub use error::{Error, Result};
pub use executor::{Task, ThreadFactory, ThreadPriority, UiDriver, UiLane, WorkerPool};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn local_dispatcher() -> Dispatcher {
        let io = WorkerPool::new(PoolConfig::io()).unwrap();
        let compute = WorkerPool::new(
            PoolConfig::builder()
                .core_threads(2)
                .max_threads(3)
                .queue_capacity(Some(8))
                .thread_name_prefix("smoke#worker")
                .build()
                .unwrap(),
        )
        .unwrap();
        let ui = UiLane::spawn(&ThreadFactory::new("smoke#ui", None)).unwrap();
        Dispatcher::new(io, compute, ui)
    }

    #[test]
    fn test_dispatch_smoke() {
        let dispatcher = local_dispatcher();
        let (tx, rx) = crossbeam_channel::bounded(1);
        dispatcher
            .dispatch(Lane::Compute, move || {
                let _ = tx.send(1 + 1);
            })
            .unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 2);
    }

    #[test]
    fn test_submit_smoke() {
        struct Sum(crossbeam_channel::Sender<u64>);

        impl Task for Sum {
            type Output = u64;

            fn produce(&mut self) -> Result<u64> {
                Ok((0u64..100).sum())
            }

            fn on_success(self: Box<Self>, value: u64) {
                let _ = self.0.send(value);
            }
        }

        let dispatcher = local_dispatcher();
        let (tx, rx) = crossbeam_channel::bounded(1);
        dispatcher.submit(Lane::Io, Sum(tx)).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 4950);
    }

    #[test]
    fn test_run_on_ui_smoke() {
        let dispatcher = local_dispatcher();
        let (tx, rx) = crossbeam_channel::bounded(1);
        dispatcher
            .run_on_ui(move || {
                let _ = tx.send(());
            })
            .unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
