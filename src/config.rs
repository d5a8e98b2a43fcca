use crate::error::{Error, Result};
use crate::executor::ThreadPriority;
use std::time::Duration;

/// What a pool does with a submission once both its queue and its thread
/// allowance are exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaturationPolicy {
    /// Fail fast: the submission returns an error.
    Abort,
    /// The submitting thread waits for queue space.
    Block,
    /// The submission is dropped silently.
    Discard,
}

impl Default for SaturationPolicy {
    fn default() -> Self {
        SaturationPolicy::Abort
    }
}

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub core_threads: usize,
    pub max_threads: usize,
    pub keep_alive: Duration,
    /// `Some(n)` for a bounded queue of capacity `n`, `None` for unbounded.
    pub queue_capacity: Option<usize>,
    pub saturation: SaturationPolicy,
    pub thread_name_prefix: String,
    pub priority: ThreadPriority,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::compute()
    }
}

impl PoolConfig {
    /// Serial disk/IO lane: one thread, unbounded queue.
    pub fn io() -> Self {
        Self {
            core_threads: 1,
            max_threads: 1,
            keep_alive: Duration::from_secs(1),
            queue_capacity: None,
            saturation: SaturationPolicy::Abort,
            thread_name_prefix: "exec#io".to_string(),
            priority: ThreadPriority::Background,
        }
    }

    /// Compute lane sized from the host CPU count: core in [2, 4],
    /// max = cpus * 2 + 1, bounded queue of 1024, fail-fast on saturation.
    pub fn compute() -> Self {
        let cpus = num_cpus::get();
        Self {
            core_threads: cpus.saturating_sub(1).clamp(2, 4),
            max_threads: (cpus * 2 + 1).min(1024),
            keep_alive: Duration::from_secs(20),
            queue_capacity: Some(1024),
            saturation: SaturationPolicy::Abort,
            thread_name_prefix: "exec#worker".to_string(),
            priority: ThreadPriority::Background,
        }
    }

    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.core_threads == 0 {
            return Err(Error::config("core_threads must be > 0"));
        }
        if self.max_threads < self.core_threads {
            return Err(Error::config("max_threads must be >= core_threads"));
        }
        if self.max_threads > 1024 {
            return Err(Error::config("max_threads too large (max 1024)"));
        }
        if self.queue_capacity == Some(0) {
            return Err(Error::config("bounded queue needs capacity > 0"));
        }
        if self.thread_name_prefix.is_empty() {
            return Err(Error::config("thread_name_prefix must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
        }
    }

    pub fn core_threads(mut self, n: usize) -> Self {
        self.config.core_threads = n;
        self
    }

    pub fn max_threads(mut self, n: usize) -> Self {
        self.config.max_threads = n;
        self
    }

    pub fn keep_alive(mut self, d: Duration) -> Self {
        self.config.keep_alive = d;
        self
    }

    pub fn queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn saturation(mut self, policy: SaturationPolicy) -> Self {
        self.config.saturation = policy;
        self
    }

    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn priority(mut self, priority: ThreadPriority) -> Self {
        self.config.priority = priority;
        self
    }

    pub fn build(self) -> Result<PoolConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
