//! Thread construction with deterministic names and scheduling priority.

use crate::error::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

/// One sequence number per factory instance, process-wide.
static POOL_SEQUENCE: AtomicUsize = AtomicUsize::new(1);

/// Requested scheduling priority for factory-created threads.
///
/// Applied from inside the new thread at startup. On Linux this maps to a
/// `nice` value; elsewhere the request is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadPriority {
    High,
    Normal,
    Background,
    Lowest,
}

impl Default for ThreadPriority {
    fn default() -> Self {
        ThreadPriority::Normal
    }
}

impl ThreadPriority {
    fn nice(self) -> i32 {
        match self {
            ThreadPriority::High => -2,
            ThreadPriority::Normal => 0,
            ThreadPriority::Background => 10,
            ThreadPriority::Lowest => 19,
        }
    }

    /// Best effort: a refused request logs a warning and the thread keeps
    /// running at its inherited priority.
    pub fn apply_to_current(self) {
        let nice = self.nice();
        if nice == 0 {
            return;
        }

        #[cfg(target_os = "linux")]
        {
            let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS as _, 0, nice) };
            if rc != 0 {
                tracing::warn!(
                    thread = thread::current().name().unwrap_or("unnamed"),
                    nice,
                    "failed to set thread priority"
                );
            }
        }
    }
}

/// Produces threads named `<prefix>-<poolSequence>-<threadSequence>` at a
/// requested priority.
///
/// The pool sequence is assigned once when the factory is constructed; the
/// thread sequence increments per thread created by that factory. Both
/// counters are atomic, so pools may call [`ThreadFactory::spawn`]
/// concurrently.
#[derive(Debug)]
pub struct ThreadFactory {
    name_prefix: String,
    priority: ThreadPriority,
    thread_sequence: AtomicUsize,
}

impl ThreadFactory {
    /// `None` priority means normal. An empty prefix falls back to `"pool"`.
    pub fn new(prefix: &str, priority: Option<ThreadPriority>) -> Self {
        let prefix = if prefix.is_empty() { "pool" } else { prefix };
        Self {
            name_prefix: format!("{}-{}", prefix, POOL_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            priority: priority.unwrap_or_default(),
            thread_sequence: AtomicUsize::new(1),
        }
    }

    fn next_name(&self) -> String {
        format!(
            "{}-{}",
            self.name_prefix,
            self.thread_sequence.fetch_add(1, Ordering::Relaxed)
        )
    }

    /// Spawn a named thread running `f` at the factory's priority.
    pub fn spawn<F>(&self, f: F) -> Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        let priority = self.priority;
        let handle = thread::Builder::new().name(self.next_name()).spawn(move || {
            priority.apply_to_current();
            f();
        })?;
        Ok(handle)
    }
}
