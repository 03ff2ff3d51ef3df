//! split-write-benchmark - write-strategy comparison tool
//!
//! Loads a spreadsheet dataset, splits it deterministically into two
//! partitions and writes it out with sequential, pooled-concurrent and
//! batched strategies, reporting duration, throughput and memory use
//! per strategy.

use anyhow::Result;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;
mod dataset;
mod metrics;
mod sink;
mod splitter;
mod strategy;
mod utils;

use config::{CliArgs, ProcessConfig};
use dataset::Dataset;
use strategy::Orchestrator;
use utils::format_count;

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn print_banner(config: &ProcessConfig, dataset: &Dataset) {
    if config.quiet {
        return;
    }

    println!("split-write-benchmark v{}", env!("CARGO_PKG_VERSION"));
    println!("====================================");
    println!("Input: {}", config.input.display());
    println!("{}", dataset.summary());
    println!(
        "Methods: {:?}",
        config
            .methods
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
    );
    println!(
        "Workers: {}, Batch size: {}, Seed: {}",
        config.num_workers, config.batch_size, config.seed
    );
    println!("Output dir: {}", config.out_dir.display());
    println!("====================================\n");
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse_args();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    // Build configuration
    let config = ProcessConfig::from_cli(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Load the dataset once; all strategies act on the same rows
    info!("Loading dataset from: {:?}", config.input);
    let dataset = dataset::load_xlsx(&config.input)?;
    info!("{}", dataset.summary());

    print_banner(&config, &dataset);

    // Run the comparison
    let orchestrator = Orchestrator::new(config.clone(), dataset);
    let records = orchestrator.run_all()?;

    metrics::reporter::print_comparison(&records);
    metrics::reporter::print_statistics(&records);

    // Export to JSON if requested
    if let Some(ref output_path) = config.output_path {
        info!("Writing results to: {:?}", output_path);
        metrics::reporter::write_json_file(output_path, &records, &config.summary())?;
    }

    // Export to CSV if requested
    if let Some(ref csv_path) = config.csv_output {
        info!("Writing CSV to: {:?}", csv_path);
        metrics::reporter::write_csv_file(csv_path, &records)?;
    }

    // Print summary
    println!("\n====================================");
    println!("COMPARISON COMPLETE");
    println!("====================================");
    println!("Strategies run: {}", records.len());
    let total_rows: u64 = records.iter().map(|r| r.rows_handled as u64).sum();
    println!("Total rows processed: {}", format_count(total_rows));

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
