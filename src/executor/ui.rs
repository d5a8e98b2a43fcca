//! The UI-serial delivery lane.
//!
//! A single-consumer FIFO queue: anything posted runs on exactly one
//! designated thread, in post order. By default the lane owns a dedicated
//! consumer thread; hosts with their own message loop take the
//! [`UiDriver`] half instead and pump it themselves.

use super::factory::ThreadFactory;
use super::pool::panic_message;
use super::Job;
use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};

/// Producer half of the UI lane.
#[derive(Debug)]
pub struct UiLane {
    tx: Sender<Job>,
    consumer: Arc<OnceLock<ThreadId>>,
}

/// Consumer half of the UI lane, for host-driven message loops.
#[derive(Debug)]
pub struct UiDriver {
    rx: Receiver<Job>,
    consumer: Arc<OnceLock<ThreadId>>,
}

impl UiLane {
    /// Default lane: spawns a dedicated consumer thread through `factory`.
    pub fn spawn(factory: &ThreadFactory) -> Result<Self> {
        let (lane, driver) = Self::channel();
        factory.spawn(move || driver.run())?;
        Ok(lane)
    }

    /// Host-driven lane: the caller drains the returned driver on the
    /// thread of its choosing.
    pub fn channel() -> (Self, UiDriver) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let consumer = Arc::new(OnceLock::new());
        (
            Self {
                tx,
                consumer: Arc::clone(&consumer),
            },
            UiDriver { rx, consumer },
        )
    }

    /// Enqueue `job` for the consumer. FIFO relative to other posts.
    pub fn post(&self, job: Job) -> Result<()> {
        self.tx.send(job).map_err(|_| Error::shut_down("ui"))
    }

    /// True when called from the consumer thread itself.
    pub fn is_current(&self) -> bool {
        self.consumer
            .get()
            .map_or(false, |id| *id == thread::current().id())
    }
}

impl UiDriver {
    /// Drain jobs until every producer handle is gone.
    pub fn run(self) {
        self.register();
        while let Ok(job) = self.rx.recv() {
            run_callback(job);
        }
    }

    /// Drain everything already queued, then return. One pump of a host
    /// message loop.
    pub fn run_until_idle(&self) {
        self.register();
        while let Ok(job) = self.rx.try_recv() {
            run_callback(job);
        }
    }

    fn register(&self) {
        let _ = self.consumer.set(thread::current().id());
    }
}

// a panicking callback must not take the UI consumer down with it
fn run_callback(job: Job) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
        tracing::error!(panic = %panic_message(payload), "ui callback panicked");
    }
}
