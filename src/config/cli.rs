//! Command-line argument parsing

use clap::Parser;
use std::path::PathBuf;

/// Compare sequential, pooled-concurrent and batched CSV write strategies
#[derive(Parser, Debug, Clone)]
#[command(name = "split-write-benchmark")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the input Excel (.xlsx) file
    pub input: PathBuf,

    // ===== Strategy Selection =====
    /// Strategy to run: sequential, concurrent or batch
    /// (repeatable; all three when omitted)
    #[arg(short = 'm', long = "method", action = clap::ArgAction::Append)]
    pub methods: Vec<String>,

    // ===== Worker / Batch Parameters =====
    /// Rows per batch for the batched strategy
    #[arg(short = 'b', long = "batch-size", default_value_t = 1000)]
    pub batch_size: usize,

    /// Writer workers per pool (0 = number of CPUs)
    #[arg(short = 'w', long = "workers", default_value_t = 0)]
    pub workers: usize,

    /// Seed for the split and sink-assignment generators
    #[arg(long = "seed", default_value_t = 99)]
    pub seed: u64,

    /// Disable buffered writes on single-writer sinks
    #[arg(long = "no-buffering")]
    pub no_buffering: bool,

    // ===== Output =====
    /// Directory receiving the per-strategy sink files
    #[arg(long = "out-dir", default_value = "output")]
    pub out_dir: PathBuf,

    /// Write the performance comparison to a JSON file
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Write the performance comparison to a CSV file
    #[arg(long = "csv-output")]
    pub csv_output: Option<PathBuf>,

    /// Suppress progress bars and informational output
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("--batch-size must be at least 1".to_string());
        }
        Ok(())
    }

    /// Get effective worker count
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        } else {
            self.workers
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["split-write-benchmark", "data.xlsx"];
        argv.extend(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let a = args(&[]);
        assert_eq!(a.input, PathBuf::from("data.xlsx"));
        assert!(a.methods.is_empty());
        assert_eq!(a.batch_size, 1000);
        assert_eq!(a.workers, 0);
        assert_eq!(a.seed, 99);
        assert_eq!(a.out_dir, PathBuf::from("output"));
        assert!(!a.no_buffering);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let a = args(&["--batch-size", "0"]);
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_effective_workers_resolves_zero() {
        let a = args(&[]);
        assert!(a.effective_workers() > 0);

        let a = args(&["--workers", "3"]);
        assert_eq!(a.effective_workers(), 3);
    }

    #[test]
    fn test_repeatable_methods() {
        let a = args(&["--method", "sequential", "--method", "batch"]);
        assert_eq!(a.methods, vec!["sequential", "batch"]);
    }
}
