//! Write strategies and orchestration
//!
//! This module provides the three-way strategy comparison engine:
//! - Sequential: single thread, one record at a time
//! - Concurrent: two worker pools draining per-partition bounded queues
//! - Batch: chunked dispatch to a worker pool with a single collector
//!
//! All sink-level failures inside a strategy are recovered locally
//! (logged and counted), so a strategy run itself never fails.

pub mod batched;
pub mod orchestrator;
pub mod pooled;
pub mod sequential;

pub use orchestrator::Orchestrator;

use std::fmt;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::ProcessConfig;
use crate::dataset::Dataset;
use crate::sink::SinkPaths;

/// Supported write strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteMethod {
    /// Single-threaded, record-at-a-time writes
    Sequential,
    /// Per-partition worker pools over bounded queues
    Concurrent,
    /// Batched dispatch with one collecting writer
    Batch,
}

impl WriteMethod {
    /// All strategies, in comparison order.
    pub fn all() -> [Self; 3] {
        [Self::Sequential, Self::Concurrent, Self::Batch]
    }

    /// Parse method name from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sequential" | "seq" => Some(Self::Sequential),
            "concurrent" | "pooled" => Some(Self::Concurrent),
            "batch" | "batched" => Some(Self::Batch),
            _ => None,
        }
    }

    /// Get display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Concurrent => "concurrent",
            Self::Batch => "batch",
        }
    }
}

impl fmt::Display for WriteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts merged from every writer involved in one strategy run.
///
/// `records_dropped` and `sink_failures` track best-effort losses: a
/// dropped record was claimed by a writer but never reached its sink.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StrategyOutcome {
    pub rows_a: u64,
    pub rows_b: u64,
    pub records_dropped: u64,
    pub sink_failures: u64,
}

impl StrategyOutcome {
    pub fn rows_written(&self) -> u64 {
        self.rows_a + self.rows_b
    }
}

/// Run one strategy over the dataset.
///
/// The caller must have cleared prior sink files for the method; both
/// sinks exist (possibly empty) when this returns.
pub fn execute(method: WriteMethod, dataset: &Dataset, config: &ProcessConfig) -> StrategyOutcome {
    let paths = SinkPaths::for_method(&config.out_dir, method.as_str());
    match method {
        WriteMethod::Sequential => sequential::run(dataset, &paths, config),
        WriteMethod::Concurrent => pooled::run(dataset, &paths, config),
        WriteMethod::Batch => batched::run(dataset, &paths, config),
    }
}

/// Progress bar in the house style; hidden when quiet.
pub(crate) fn progress_bar(len: u64, label: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({msg})")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(label.to_string());
    pb
}
