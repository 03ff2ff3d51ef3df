//! Sequential write strategy
//!
//! Baseline: the calling thread writes partition A, then partition B, one
//! record at a time, with no buffering beyond what the I/O layer provides
//! by default. Sink order is identical to partition order.

use std::path::Path;

use tracing::warn;

use crate::config::ProcessConfig;
use crate::dataset::{Dataset, Record};
use crate::sink::{CsvSink, SinkPaths};
use crate::splitter;

use super::{progress_bar, StrategyOutcome};

struct PartitionOutcome {
    written: u64,
    dropped: u64,
    sink_failed: bool,
}

/// Write both partitions on the calling thread.
///
/// Both sink files are created even when a partition is empty. A write
/// failure drops that record and continues; an open failure drops the
/// whole partition but still lets the other one proceed.
pub fn run(dataset: &Dataset, paths: &SinkPaths, config: &ProcessConfig) -> StrategyOutcome {
    let (part_a, part_b) = splitter::split(dataset, config.seed);

    let a = write_partition(part_a, &paths.a, config, "sequential VA");
    let b = write_partition(part_b, &paths.b, config, "sequential VB");

    StrategyOutcome {
        rows_a: a.written,
        rows_b: b.written,
        records_dropped: a.dropped + b.dropped,
        sink_failures: a.sink_failed as u64 + b.sink_failed as u64,
    }
}

fn write_partition(
    records: &[Record],
    path: &Path,
    config: &ProcessConfig,
    label: &str,
) -> PartitionOutcome {
    let pb = progress_bar(records.len() as u64, label, config.quiet);

    let mut sink = match CsvSink::create(path, false) {
        Ok(sink) => sink,
        Err(e) => {
            warn!("{}: {}", label, e);
            pb.abandon();
            return PartitionOutcome {
                written: 0,
                dropped: records.len() as u64,
                sink_failed: true,
            };
        }
    };

    let mut written = 0u64;
    let mut dropped = 0u64;

    for record in records {
        match sink.write_record(record) {
            Ok(()) => written += 1,
            Err(e) => {
                dropped += 1;
                // Log first few errors for debugging
                if dropped <= 3 {
                    warn!("{}: {}", label, e);
                }
            }
        }
        pb.inc(1);
    }

    if let Err(e) = sink.flush() {
        warn!("{}: {}", label, e);
    }
    pb.finish_with_message("done");

    PartitionOutcome {
        written,
        dropped,
        sink_failed: false,
    }
}
