//! Performance measurement around strategy invocations
//!
//! The recorder itself introduces no concurrency: it runs strategies one
//! at a time on the calling thread, so the measured runs never compete
//! with each other for CPU or I/O.

use std::time::{Duration, Instant};

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::strategy::{StrategyOutcome, WriteMethod};

/// Performance record for one strategy run.
///
/// Immutable after creation. Duration, throughput and memory-in-MB are
/// derived on demand and never stored.
#[derive(Debug, Clone)]
pub struct PerformanceRecord {
    pub method: WriteMethod,
    pub start_time: Instant,
    pub end_time: Instant,
    /// Row count of the original dataset, not post-split counts.
    pub rows_handled: usize,
    /// Process resident memory sampled right after completion.
    pub memory_used_bytes: u64,
}

impl PerformanceRecord {
    pub fn duration(&self) -> Duration {
        self.end_time.duration_since(self.start_time)
    }

    /// Wall-clock seconds, clamped away from zero so rates stay finite.
    pub fn duration_secs(&self) -> f64 {
        self.duration().as_secs_f64().max(1e-6)
    }

    pub fn rows_per_sec(&self) -> f64 {
        self.rows_handled as f64 / self.duration_secs()
    }

    pub fn memory_mb(&self) -> f64 {
        self.memory_used_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Process memory sampler
pub struct MemorySampler {
    system: System,
    pid: Pid,
}

impl MemorySampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: Pid::from_u32(std::process::id()),
        }
    }

    /// Resident set size in bytes; 0 if the process cannot be inspected.
    pub fn sample(&mut self) -> u64 {
        let refresh_kind = ProcessRefreshKind::new().with_memory();
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            refresh_kind,
        );
        self.system
            .process(self.pid)
            .map(|p| p.memory())
            .unwrap_or(0)
    }
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps strategy invocations and produces performance records.
pub struct MetricsRecorder {
    sampler: MemorySampler,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            sampler: MemorySampler::new(),
        }
    }

    /// Measure one full strategy invocation, including its worker joins.
    ///
    /// The memory snapshot is taken immediately after the invocation
    /// returns.
    pub fn measure<F>(
        &mut self,
        method: WriteMethod,
        rows_handled: usize,
        invoke: F,
    ) -> (PerformanceRecord, StrategyOutcome)
    where
        F: FnOnce() -> StrategyOutcome,
    {
        let start_time = Instant::now();
        let outcome = invoke();
        let end_time = Instant::now();
        let memory_used_bytes = self.sampler.sample();

        (
            PerformanceRecord {
                method,
                start_time,
                end_time,
                rows_handled,
                memory_used_bytes,
            },
            outcome,
        )
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
