//! Processing configuration derived from CLI arguments

use std::path::PathBuf;

use super::cli::CliArgs;
use crate::strategy::WriteMethod;

/// Complete processing configuration for one comparison session.
///
/// `seed` is the only process-wide constant shared across strategy runs;
/// every generator instance in the run is seeded from it independently.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub input: PathBuf,

    // Strategy selection
    pub methods: Vec<WriteMethod>,

    // Worker / batch parameters
    pub batch_size: usize,
    pub num_workers: usize,
    pub use_buffering: bool,
    pub seed: u64,

    // Output
    pub out_dir: PathBuf,
    pub output_path: Option<PathBuf>,
    pub csv_output: Option<PathBuf>,
    pub quiet: bool,
    pub verbose: bool,
}

impl ProcessConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        args.validate()?;

        // Determine strategies to run (all three when unspecified)
        let methods = if args.methods.is_empty() {
            WriteMethod::all().to_vec()
        } else {
            args.methods
                .iter()
                .map(|m| {
                    WriteMethod::parse(m).ok_or_else(|| format!("Unknown method: {}", m))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let num_workers = args.effective_workers();
        if num_workers == 0 {
            return Err("--workers must resolve to at least 1".to_string());
        }

        Ok(Self {
            input: args.input.clone(),
            methods,
            batch_size: args.batch_size,
            num_workers,
            use_buffering: !args.no_buffering,
            seed: args.seed,
            out_dir: args.out_dir.clone(),
            output_path: args.output.clone(),
            csv_output: args.csv_output.clone(),
            quiet: args.quiet,
            verbose: args.verbose,
        })
    }

    /// One-line summary for the banner and exports.
    pub fn summary(&self) -> String {
        let methods: Vec<&str> = self.methods.iter().map(|m| m.as_str()).collect();
        format!(
            "methods={:?} workers={} batch_size={} seed={} buffering={}",
            methods, self.num_workers, self.batch_size, self.seed, self.use_buffering
        )
    }
}
