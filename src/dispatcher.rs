//! The three-lane dispatch facade.

use crate::config::PoolConfig;
use crate::error::{Error, Result};
use crate::executor::pool::panic_message;
use crate::executor::{Job, Task, ThreadFactory, UiLane, WorkerPool};
use parking_lot::{Mutex, RwLock};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

/// The two pool-backed submission targets. The UI lane is addressed through
/// [`Dispatcher::run_on_ui`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// Serial disk/IO lane, one worker.
    Io,
    /// Bounded multi-worker compute lane.
    Compute,
}

// Process-wide instances. The default is built lazily, at most once; the
// custom override is installed at most once, first caller wins.
static DEFAULT: OnceLock<Arc<Dispatcher>> = OnceLock::new();
static CUSTOM: RwLock<Option<Arc<Dispatcher>>> = RwLock::new(None);

/// Routes work onto one of three fixed execution contexts and marshals task
/// results back to the UI lane.
///
/// Obtain one through [`Dispatcher::global`] (process-wide default),
/// [`Dispatcher::configure`] (one-time custom override), or
/// [`Dispatcher::new`] (embedder-owned, no global state).
#[derive(Debug)]
pub struct Dispatcher {
    io: WorkerPool,
    compute: WorkerPool,
    ui: UiLane,
    shutdown_lock: Mutex<()>,
}

impl Dispatcher {
    /// Build a dispatcher from caller-supplied lanes.
    pub fn new(io: WorkerPool, compute: WorkerPool, ui: UiLane) -> Self {
        Self {
            io,
            compute,
            ui,
            shutdown_lock: Mutex::new(()),
        }
    }

    fn with_defaults() -> Result<Self> {
        let io = WorkerPool::new(PoolConfig::io())?;
        let compute = WorkerPool::new(PoolConfig::compute())?;
        let ui = UiLane::spawn(&ThreadFactory::new("exec#ui", None))?;
        Ok(Self::new(io, compute, ui))
    }

    /// The process-wide default instance, constructed on first call.
    /// Concurrent first callers observe the same instance.
    pub fn global() -> Arc<Dispatcher> {
        DEFAULT
            .get_or_init(|| {
                Arc::new(Dispatcher::with_defaults().expect("default dispatcher construction failed"))
            })
            .clone()
    }

    /// Install a custom process-wide instance from caller-supplied pools
    /// (and optionally a custom UI lane). The first caller wins; later
    /// calls ignore their arguments and return the installed instance.
    /// Irrevocable without a process restart.
    pub fn configure(io: WorkerPool, compute: WorkerPool, ui: Option<UiLane>) -> Result<Arc<Dispatcher>> {
        if let Some(existing) = CUSTOM.read().as_ref() {
            return Ok(Arc::clone(existing));
        }
        let mut slot = CUSTOM.write();
        if let Some(existing) = slot.as_ref() {
            return Ok(Arc::clone(existing));
        }
        if io.is_shut_down() || compute.is_shut_down() {
            return Err(Error::invalid_argument("cannot install a shut-down pool"));
        }
        let ui = match ui {
            Some(ui) => ui,
            None => UiLane::spawn(&ThreadFactory::new("exec#ui", None))?,
        };
        let dispatcher = Arc::new(Dispatcher::new(io, compute, ui));
        *slot = Some(Arc::clone(&dispatcher));
        Ok(dispatcher)
    }

    fn pool(&self, lane: Lane) -> &WorkerPool {
        match lane {
            Lane::Io => &self.io,
            Lane::Compute => &self.compute,
        }
    }

    /// Fire-and-forget: enqueue `work` on the chosen pool.
    ///
    /// No result marshaling happens; callers that need UI delivery
    /// re-dispatch from inside `work` via [`Dispatcher::run_on_ui`]. Fails
    /// fast when the pool is saturated or shut down.
    pub fn dispatch<F>(&self, lane: Lane, work: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool(lane)
            .submit(Box::new(work))
            .map_err(|rejected| rejected.reason)
    }

    /// Submit a two-phase task: run `produce` on the chosen pool, **block
    /// the calling thread** until the result is ready, then deliver exactly
    /// one of `on_success` / `on_failure` on the UI lane.
    ///
    /// Every failure mode funnels into the same `on_failure` delivery:
    /// `produce` returning an error, `produce` panicking, the pool
    /// rejecting the submission, and the job being discarded by a shutdown
    /// before it produced anything. `Ok(())` means a delivery was
    /// scheduled; an error means the UI lane itself was gone.
    pub fn submit<T: Task>(&self, lane: Lane, task: T) -> Result<()> {
        let slot = Arc::new(Mutex::new(Some(Box::new(task))));
        let (tx, rx) = crossbeam_channel::bounded::<Result<T::Output>>(1);

        let worker_slot = Arc::clone(&slot);
        let job: Job = Box::new(move || {
            let outcome = {
                let mut guard = worker_slot.lock();
                match guard.as_mut() {
                    Some(task) => catch_unwind(AssertUnwindSafe(|| task.produce()))
                        .unwrap_or_else(|payload| Err(Error::worker_panic(panic_message(payload)))),
                    None => return,
                }
            };
            let _ = tx.send(outcome);
        });

        let outcome = match self.pool(lane).submit(job) {
            // the rendezvous ends when the worker sends, or never (job
            // discarded by shutdown), which surfaces as a disconnect
            Ok(()) => rx.recv().unwrap_or(Err(Error::Handoff)),
            Err(rejected) => Err(rejected.reason),
        };

        let task = match slot.lock().take() {
            Some(task) => task,
            None => return Err(Error::Handoff),
        };
        match outcome {
            Ok(value) => self.ui.post(Box::new(move || task.on_success(value))),
            Err(error) => self.ui.post(Box::new(move || task.on_failure(error))),
        }
    }

    /// Enqueue `work` on the UI lane. Non-blocking.
    pub fn run_on_ui<F>(&self, work: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.ui.post(Box::new(work))
    }

    /// Idempotently terminate the IO and compute pools, discarding queued
    /// work. The UI lane is not owned by the dispatcher and is left
    /// untouched, so callbacks already enqueued still get delivered.
    /// Serialized internally; concurrent calls cannot double-terminate.
    pub fn shutdown(&self) {
        let _guard = self.shutdown_lock.lock();
        self.io.shutdown_now();
        self.compute.shutdown_now();
    }

    pub fn io(&self) -> &WorkerPool {
        &self.io
    }

    pub fn compute(&self) -> &WorkerPool {
        &self.compute
    }

    pub fn ui(&self) -> &UiLane {
        &self.ui
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // No other test in this binary installs the custom instance, so the
    // guard is observable deterministically. The success path is covered by
    // the integration tests, which run in their own process.
    #[test]
    fn test_configure_refuses_shut_down_pools() {
        let io = WorkerPool::new(PoolConfig::io()).unwrap();
        let compute = WorkerPool::new(PoolConfig::compute()).unwrap();
        io.shutdown_now();

        let result = Dispatcher::configure(io, compute, None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
