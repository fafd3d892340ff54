//! Elapsed-time measurement for repository operations.

use std::time::{Duration, Instant};

use tracing::info;

use crate::config::ProfilingConfig;

/// A stopwatch that only reports when profiling is enabled.
#[derive(Debug, Clone)]
pub struct Profiler {
    started: Instant,
    config: ProfilingConfig,
}

impl Profiler {
    /// Start timing now.
    pub fn start(config: &ProfilingConfig) -> Self {
        Self {
            started: Instant::now(),
            config: config.clone(),
        }
    }

    /// Restart timing from now.
    pub fn reset(&mut self) {
        self.started = Instant::now();
    }

    /// Time since start (or the last reset).
    ///
    /// Returns `None` when profiling is disabled. With `log` set, the
    /// measurement is also emitted at `info` labelled with `message`.
    pub fn end_record(&self, message: &str) -> Option<Duration> {
        if !self.config.enabled {
            return None;
        }

        let elapsed = self.started.elapsed();
        if self.config.log {
            info!(elapsed_ms = elapsed.as_secs_f64() * 1000.0, "{message} : {elapsed:?}");
        }
        Some(elapsed)
    }
}
