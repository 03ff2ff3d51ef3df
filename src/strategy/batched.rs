//! Batched write strategy
//!
//! Chunks the full dataset into fixed-size batches dispatched through one
//! bounded job queue to a pool of forwarding workers. A single collector
//! owns both sink handles and performs every write, so the sinks never see
//! concurrent writers even though batches move through the pool in
//! parallel.
//!
//! Sink assignment here is a fresh per-record coin flip at write time; the
//! splitter partition is deliberately not consulted, so A/B membership
//! differs from the other strategies while the total row count still
//! matches. The flip generator is seeded with the session seed as its own
//! instance, independent of the splitter's.
//!
//! Termination: the job queue closes when the dispatcher drops its sender
//! after the last batch; each worker exits once the job queue is closed
//! and drained; the collector's drain loop ends when the last worker has
//! exited and the result queue is empty.

use std::path::Path;
use std::thread;

use crossbeam::channel::{self, Receiver};
use indicatif::ProgressBar;
use tracing::{debug, warn};

use crate::config::ProcessConfig;
use crate::dataset::{Dataset, Record};
use crate::sink::{CsvSink, SinkPaths};

use super::{progress_bar, StrategyOutcome};

/// Number of batches a dataset of `total` records dispatches.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    total.div_ceil(batch_size)
}

/// Run the batched strategy over the full dataset.
pub fn run(dataset: &Dataset, paths: &SinkPaths, config: &ProcessConfig) -> StrategyOutcome {
    let pb = progress_bar(dataset.len() as u64, "batch", config.quiet);

    let (outcome, dispatched) = thread::scope(|s| {
        let (job_tx, job_rx) = channel::bounded::<&[Record]>(config.num_workers);
        let (result_tx, result_rx) = channel::bounded::<&[Record]>(config.num_workers);

        let workers: Vec<_> = (0..config.num_workers)
            .map(|id| {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                thread::Builder::new()
                    .name(format!("batch-worker-{}", id))
                    .spawn_scoped(s, move || {
                        for batch in job_rx {
                            if result_tx.send(batch).is_err() {
                                break;
                            }
                        }
                    })
                    .expect("Failed to spawn worker thread")
            })
            .collect();
        drop(job_rx);
        // The workers hold the only remaining result senders; the
        // collector's loop ends exactly when the last of them exits.
        drop(result_tx);

        let batch_size = config.batch_size;
        let rows = dataset.rows();
        let dispatcher = thread::Builder::new()
            .name("batch-dispatch".to_string())
            .spawn_scoped(s, move || {
                let mut dispatched = 0usize;
                for batch in rows.chunks(batch_size) {
                    if job_tx.send(batch).is_err() {
                        break;
                    }
                    dispatched += 1;
                }
                dispatched
            })
            .expect("Failed to spawn dispatcher thread");

        // The calling thread is the collector.
        let outcome = collect(result_rx, paths, config, &pb);

        for handle in workers {
            handle.join().expect("Worker thread panicked");
        }
        let dispatched = dispatcher.join().expect("Dispatcher thread panicked");
        (outcome, dispatched)
    });

    pb.finish_with_message("done");
    debug!(
        "batch: dispatched {} batches of up to {} rows",
        dispatched, config.batch_size
    );
    outcome
}

/// Drain forwarded batches and perform every sink write on this thread.
fn collect(
    result_rx: Receiver<&[Record]>,
    paths: &SinkPaths,
    config: &ProcessConfig,
    pb: &ProgressBar,
) -> StrategyOutcome {
    let mut rng = fastrand::Rng::with_seed(config.seed);
    let mut outcome = StrategyOutcome::default();

    let mut sink_a = open_sink(&paths.a, config, &mut outcome);
    let mut sink_b = open_sink(&paths.b, config, &mut outcome);

    for batch in result_rx {
        for record in batch {
            let to_a = rng.f32() < 0.5;
            let sink = if to_a { &mut sink_a } else { &mut sink_b };
            match sink {
                Some(sink) => match sink.write_record(record) {
                    Ok(()) => {
                        if to_a {
                            outcome.rows_a += 1;
                        } else {
                            outcome.rows_b += 1;
                        }
                    }
                    Err(e) => {
                        outcome.records_dropped += 1;
                        // Log first few errors for debugging
                        if outcome.records_dropped <= 3 {
                            warn!("batch collector: {}", e);
                        }
                    }
                },
                // Sink never opened; its share of records is skipped.
                None => outcome.records_dropped += 1,
            }
            pb.inc(1);
        }
    }

    for sink in [&mut sink_a, &mut sink_b].into_iter().flatten() {
        if let Err(e) = sink.flush() {
            warn!("batch collector: {}", e);
        }
    }

    outcome
}

fn open_sink(path: &Path, config: &ProcessConfig, outcome: &mut StrategyOutcome) -> Option<CsvSink> {
    match CsvSink::create(path, config.use_buffering) {
        Ok(sink) => Some(sink),
        Err(e) => {
            warn!("batch collector: {}", e);
            outcome.sink_failures += 1;
            None
        }
    }
}
