//! Console shell for the dispatcher.
//!
//! Maps input gestures to dispatcher operations: compute/IO tasks with
//! UI-delivered results,
//! fire-and-forget work with manual UI redispatch, direct UI posts, and a
//! one-time custom-pool configuration. The UI lane is host-driven: this
//! main thread pumps it after every gesture.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use trilane::{
    Dispatcher, Error, Lane, PoolConfig, Task, UiDriver, UiLane, WorkerPool,
};

/// Simulated load: sleep, then report the worker thread it ran on.
struct SimulatedLoad {
    millis: u64,
    fail: bool,
}

impl Task for SimulatedLoad {
    type Output = String;

    fn produce(&mut self) -> trilane::Result<String> {
        thread::sleep(Duration::from_millis(self.millis));
        if self.fail {
            return Err(Error::worker("simulated failure"));
        }
        Ok(format!(
            "took {}ms on {}",
            self.millis,
            thread::current().name().unwrap_or("unnamed")
        ))
    }

    fn on_success(self: Box<Self>, value: String) {
        append_line(&value);
    }

    fn on_failure(self: Box<Self>, error: Error) {
        append_line(&format!("error: {error}"));
    }
}

fn append_line(text: &str) {
    println!("  {text}");
}

fn menu() {
    println!();
    println!("1) compute task, result on UI lane");
    println!("2) compute fire-and-forget, manual UI redispatch");
    println!("3) io task, result on UI lane");
    println!("4) io task that fails");
    println!("5) run directly on the UI lane");
    println!("6) one-time custom pools, compute task");
    println!("q) quit");
    print!("> ");
    let _ = io::stdout().flush();
}

fn pump(driver: &UiDriver) {
    // give the blocking submit's delivery a moment to land, then drain
    thread::sleep(Duration::from_millis(50));
    driver.run_until_idle();
}

fn main() -> trilane::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (ui, driver) = UiLane::channel();
    let dispatcher = Arc::new(Dispatcher::new(
        WorkerPool::new(PoolConfig::io())?,
        WorkerPool::new(PoolConfig::compute())?,
        ui,
    ));

    let stdin = io::stdin();
    menu();
    for line in stdin.lock().lines() {
        let line = line.unwrap_or_default();
        match line.trim() {
            "1" => {
                dispatcher.submit(Lane::Compute, SimulatedLoad { millis: 1000, fail: false })?;
                pump(&driver);
            }
            "2" => {
                let inner = Arc::clone(&dispatcher);
                dispatcher.dispatch(Lane::Compute, move || {
                    thread::sleep(Duration::from_millis(1000));
                    let msg = format!(
                        "took 1000ms on {}",
                        thread::current().name().unwrap_or("unnamed")
                    );
                    let _ = inner.run_on_ui(move || append_line(&msg));
                })?;
                // the work is asynchronous; wait long enough to see it
                thread::sleep(Duration::from_millis(1100));
                pump(&driver);
            }
            "3" => {
                dispatcher.submit(Lane::Io, SimulatedLoad { millis: 500, fail: false })?;
                pump(&driver);
            }
            "4" => {
                dispatcher.submit(Lane::Io, SimulatedLoad { millis: 500, fail: true })?;
                pump(&driver);
            }
            "5" => {
                dispatcher.run_on_ui(|| {
                    append_line(&format!(
                        "on {}",
                        thread::current().name().unwrap_or("unnamed")
                    ));
                })?;
                pump(&driver);
            }
            "6" => {
                // first call installs the custom instance; repeats reuse it
                let custom = Dispatcher::configure(
                    WorkerPool::new(
                        PoolConfig::builder()
                            .core_threads(1)
                            .max_threads(1)
                            .queue_capacity(None)
                            .thread_name_prefix("custom#io")
                            .build()?,
                    )?,
                    WorkerPool::new(
                        PoolConfig::builder()
                            .core_threads(3)
                            .max_threads(5)
                            .keep_alive(Duration::from_secs(2))
                            .queue_capacity(Some(1024))
                            .thread_name_prefix("custom#worker")
                            .build()?,
                    )?,
                    None,
                )?;
                custom.submit(Lane::Compute, SimulatedLoad { millis: 1000, fail: false })?;
            }
            "q" => break,
            _ => {}
        }
        menu();
    }

    dispatcher.shutdown();
    Ok(())
}
