//! Configuration module

pub mod cli;
pub mod process_config;

pub use cli::CliArgs;
pub use process_config::ProcessConfig;
