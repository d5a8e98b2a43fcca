//! The two-phase unit of work.

use crate::error::{Error, Result};

/// A background computation with UI-delivered completion.
///
/// `produce` runs exactly once on a worker thread of the lane the task was
/// submitted to. Exactly one of `on_success` / `on_failure` then runs,
/// exactly once, on the UI lane, never on the worker thread. Callers
/// observing results from the UI context therefore need no synchronization
/// of their own.
///
/// The callbacks consume the boxed task, so a second delivery is
/// unrepresentable.
///
/// # Example
///
/// ```no_run
/// use trilane::{Dispatcher, Error, Lane, Task};
///
/// struct Checksum {
///     path: String,
/// }
///
/// impl Task for Checksum {
///     type Output = u64;
///
///     fn produce(&mut self) -> trilane::Result<u64> {
///         let bytes = std::fs::read(&self.path).map_err(|e| Error::worker(e.to_string()))?;
///         Ok(bytes.iter().map(|b| *b as u64).sum())
///     }
///
///     fn on_success(self: Box<Self>, sum: u64) {
///         println!("{}: {sum}", self.path);
///     }
/// }
///
/// Dispatcher::global()
///     .submit(Lane::Io, Checksum { path: "data.bin".into() })
///     .unwrap();
/// ```
pub trait Task: Send + 'static {
    /// Result of the background phase.
    type Output: Send + 'static;

    /// The background computation. Runs on a worker thread.
    fn produce(&mut self) -> Result<Self::Output>;

    /// Completion callback. Runs on the UI lane.
    fn on_success(self: Box<Self>, value: Self::Output);

    /// Failure callback. Runs on the UI lane. The default reports the error
    /// and drops the task.
    fn on_failure(self: Box<Self>, error: Error) {
        tracing::error!(%error, "task failed");
    }
}
