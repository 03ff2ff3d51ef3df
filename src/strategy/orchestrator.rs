//! Strategy orchestration
//!
//! Runs the selected strategies strictly one after another so measured
//! runs never compete for CPU or I/O, clearing prior sink files before
//! each run and wrapping every invocation in the metrics recorder.

use std::fs;

use tracing::{info, warn};

use crate::config::ProcessConfig;
use crate::dataset::Dataset;
use crate::metrics::{MetricsRecorder, PerformanceRecord};
use crate::sink::SinkPaths;
use crate::utils::Result;

use super::execute;

pub struct Orchestrator {
    config: ProcessConfig,
    dataset: Dataset,
}

impl Orchestrator {
    pub fn new(config: ProcessConfig, dataset: Dataset) -> Self {
        Self { config, dataset }
    }

    /// Run all configured strategies and collect one record per run.
    pub fn run_all(&self) -> Result<Vec<PerformanceRecord>> {
        fs::create_dir_all(&self.config.out_dir)?;

        let mut recorder = MetricsRecorder::new();
        let mut records = Vec::with_capacity(self.config.methods.len());

        for &method in &self.config.methods {
            if !self.config.quiet {
                println!("\nRunning strategy: {}", method);
            }

            let paths = SinkPaths::for_method(&self.config.out_dir, method.as_str());
            paths.reset()?;

            let (record, outcome) = recorder.measure(method, self.dataset.len(), || {
                execute(method, &self.dataset, &self.config)
            });

            info!(
                "{}: {} rows written (VA={}, VB={})",
                method,
                outcome.rows_written(),
                outcome.rows_a,
                outcome.rows_b
            );
            if outcome.records_dropped > 0 || outcome.sink_failures > 0 {
                warn!(
                    "{}: best-effort run lost {} records across {} sink failures",
                    method, outcome.records_dropped, outcome.sink_failures
                );
            }

            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliArgs;
    use crate::strategy::WriteMethod;
    use clap::Parser;
    use std::fs;
    use std::path::Path;

    fn test_config(out_dir: &Path) -> ProcessConfig {
        let args = CliArgs::parse_from([
            "split-write-benchmark",
            "data.xlsx",
            "--quiet",
            "--workers",
            "4",
            "--batch-size",
            "200",
        ]);
        let mut config = ProcessConfig::from_cli(&args).unwrap();
        config.out_dir = out_dir.to_path_buf();
        config
    }

    fn dataset(n: usize) -> Dataset {
        Dataset::from_rows((0..n).map(|i| vec![format!("row{}", i)]).collect())
    }

    fn line_count(path: &Path) -> usize {
        fs::read_to_string(path).unwrap().lines().count()
    }

    #[test]
    fn test_all_strategies_preserve_total_row_count() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let orchestrator = Orchestrator::new(config.clone(), dataset(1001));

        let records = orchestrator.run_all().unwrap();
        assert_eq!(records.len(), 3);

        for method in WriteMethod::all() {
            let paths = SinkPaths::for_method(dir.path(), method.as_str());
            assert_eq!(
                line_count(&paths.a) + line_count(&paths.b),
                1001,
                "{} row count",
                method
            );
        }

        for record in &records {
            assert_eq!(record.rows_handled, 1001);
            assert!(record.duration_secs() > 0.0);
        }
    }

    #[test]
    fn test_stale_sinks_are_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let paths = SinkPaths::for_method(dir.path(), "concurrent");
        fs::write(&paths.a, "stale\nstale\nstale\n").unwrap();

        let orchestrator = Orchestrator::new(config, dataset(10));
        orchestrator.run_all().unwrap();

        assert_eq!(line_count(&paths.a) + line_count(&paths.b), 10);
    }

    #[test]
    fn test_empty_dataset_completes_with_empty_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let orchestrator = Orchestrator::new(config, Dataset::default());

        let records = orchestrator.run_all().unwrap();
        assert_eq!(records.len(), 3);

        for method in WriteMethod::all() {
            let paths = SinkPaths::for_method(dir.path(), method.as_str());
            assert_eq!(fs::read_to_string(&paths.a).unwrap(), "");
            assert_eq!(fs::read_to_string(&paths.b).unwrap(), "");
        }
    }

    #[test]
    fn test_creates_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.out_dir = dir.path().join("nested").join("out");
        config.methods = vec![WriteMethod::Sequential];

        let orchestrator = Orchestrator::new(config.clone(), dataset(5));
        orchestrator.run_all().unwrap();

        let paths = SinkPaths::for_method(&config.out_dir, "sequential");
        assert!(paths.a.exists());
        assert!(paths.b.exists());
    }
}
