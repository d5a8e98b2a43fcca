//! Queue-backed elastic worker pool.
//!
//! Submissions spawn workers up to the core count, then enqueue. A full
//! bounded queue grows the pool up to the max count before the saturation
//! policy applies. Workers idle longer than the keep-alive retire until only
//! the core complement remains.

use super::factory::ThreadFactory;
use super::Job;
use crate::config::{PoolConfig, SaturationPolicy};
use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A submission handed back by a pool that would not accept it.
///
/// Carries the job so the caller can fall back to its own delivery path
/// instead of losing the work silently.
pub struct RejectedJob {
    pub reason: Error,
    pub job: Job,
}

impl std::fmt::Debug for RejectedJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RejectedJob")
            .field("reason", &self.reason)
            .finish()
    }
}

struct PoolInner {
    config: PoolConfig,
    factory: ThreadFactory,
    tx: Sender<Job>,
    rx: Receiver<Job>,
    live: AtomicUsize,
    shut_down: AtomicBool,
}

/// One of the dispatcher's pool-backed lanes.
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl WorkerPool {
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;

        let (tx, rx) = match config.queue_capacity {
            Some(capacity) => crossbeam_channel::bounded(capacity),
            None => crossbeam_channel::unbounded(),
        };
        let factory = ThreadFactory::new(&config.thread_name_prefix, Some(config.priority));

        Ok(Self {
            inner: Arc::new(PoolInner {
                config,
                factory,
                tx,
                rx,
                live: AtomicUsize::new(0),
                shut_down: AtomicBool::new(false),
            }),
        })
    }

    /// Enqueue a job, growing the pool if the config allows it.
    ///
    /// Rejections hand the job back so the caller decides what a lost
    /// submission means.
    pub fn submit(&self, job: Job) -> std::result::Result<(), RejectedJob> {
        let inner = &self.inner;
        if inner.shut_down.load(Ordering::Acquire) {
            return Err(RejectedJob {
                reason: Error::shut_down(inner.config.thread_name_prefix.clone()),
                job,
            });
        }

        let job = match self.try_grow(inner.config.core_threads, job) {
            Ok(()) => return Ok(()),
            Err(job) => job,
        };

        match inner.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => {
                let job = match self.try_grow(inner.config.max_threads, job) {
                    Ok(()) => return Ok(()),
                    Err(job) => job,
                };
                self.saturated(job)
            }
            Err(TrySendError::Disconnected(job)) => Err(RejectedJob {
                reason: Error::shut_down(inner.config.thread_name_prefix.clone()),
                job,
            }),
        }
    }

    fn saturated(&self, job: Job) -> std::result::Result<(), RejectedJob> {
        let inner = &self.inner;
        match inner.config.saturation {
            SaturationPolicy::Abort => {
                tracing::debug!(
                    lane = %inner.config.thread_name_prefix,
                    "submission rejected, queue saturated"
                );
                Err(RejectedJob {
                    reason: Error::rejected(inner.config.thread_name_prefix.clone()),
                    job,
                })
            }
            SaturationPolicy::Block => inner.tx.send(job).map_err(|e| RejectedJob {
                reason: Error::shut_down(inner.config.thread_name_prefix.clone()),
                job: e.into_inner(),
            }),
            SaturationPolicy::Discard => {
                tracing::debug!(
                    lane = %inner.config.thread_name_prefix,
                    "submission discarded, queue saturated"
                );
                Ok(())
            }
        }
    }

    /// Reserve a worker slot below `limit` and spawn a worker seeded with
    /// `job`. Hands the job back untouched if the pool is already at the
    /// limit (or the spawn itself failed).
    fn try_grow(&self, limit: usize, job: Job) -> std::result::Result<(), Job> {
        let inner = &self.inner;
        loop {
            let live = inner.live.load(Ordering::Acquire);
            if live >= limit {
                return Err(job);
            }
            if inner
                .live
                .compare_exchange(live, live + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                break;
            }
        }

        let seed = Arc::new(Mutex::new(Some(job)));
        let pool = Arc::clone(inner);
        let worker_seed = Arc::clone(&seed);
        match inner.factory.spawn(move || worker_loop(pool, worker_seed)) {
            Ok(_) => Ok(()),
            Err(e) => {
                inner.live.fetch_sub(1, Ordering::AcqRel);
                tracing::warn!(
                    lane = %inner.config.thread_name_prefix,
                    error = %e,
                    "worker spawn failed, falling back to queue"
                );
                match seed.lock().take() {
                    Some(job) => Err(job),
                    // unreachable: the spawn never ran, so the seed is intact
                    None => Ok(()),
                }
            }
        }
    }

    /// Idempotently terminate the pool: discard queued jobs, stop accepting
    /// new ones, and wake idle workers so they observe the flag and exit.
    /// In-flight jobs run to completion; threads are not interruptible.
    pub fn shutdown_now(&self) {
        let inner = &self.inner;
        if inner.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut discarded = 0usize;
        while inner.rx.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            tracing::debug!(
                lane = %inner.config.thread_name_prefix,
                discarded,
                "shutdown discarded queued jobs"
            );
        }

        // one wake-up token per live worker; surplus tokens die with the queue
        for _ in 0..inner.live.load(Ordering::Acquire) {
            let _ = inner.tx.try_send(Box::new(|| {}));
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::Acquire)
    }

    /// Worker threads currently alive (busy or idle).
    pub fn live_threads(&self) -> usize {
        self.inner.live.load(Ordering::Acquire)
    }

    /// Jobs waiting in the queue.
    pub fn queued(&self) -> usize {
        self.inner.rx.len()
    }

    pub fn name(&self) -> &str {
        &self.inner.config.thread_name_prefix
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name())
            .field("live", &self.live_threads())
            .field("queued", &self.queued())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown_now();
    }
}

fn worker_loop(inner: Arc<PoolInner>, seed: Arc<Mutex<Option<Job>>>) {
    if let Some(job) = seed.lock().take() {
        run_job(job);
    }
    drop(seed);

    loop {
        if inner.shut_down.load(Ordering::Acquire) {
            break;
        }
        match inner.rx.recv_timeout(inner.config.keep_alive) {
            Ok(job) => run_job(job),
            Err(RecvTimeoutError::Timeout) => {
                if try_retire(&inner) {
                    // the slot was already released by the CAS
                    return;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    inner.live.fetch_sub(1, Ordering::AcqRel);
}

fn run_job(job: Job) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
        tracing::error!(
            thread = std::thread::current().name().unwrap_or("unnamed"),
            panic = %panic_message(payload),
            "worker job panicked"
        );
    }
}

/// Release this worker's slot if the pool stays at or above its core count.
/// CAS loop so two idle workers cannot both retire past the core floor.
fn try_retire(inner: &PoolInner) -> bool {
    loop {
        let live = inner.live.load(Ordering::Acquire);
        if live <= inner.config.core_threads {
            return false;
        }
        if inner
            .live
            .compare_exchange(live, live - 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            return true;
        }
    }
}

pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
