//! Error types for split-write-benchmark

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source load error: {0}")]
    Source(#[from] SourceError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Fatal errors raised while loading the input spreadsheet.
///
/// Any of these aborts the run before a single strategy executes.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("input file '{}' does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error("input file must be an Excel (.xlsx) file: {}", .path.display())]
    WrongExtension { path: PathBuf },

    #[error("failed to open workbook {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: calamine::XlsxError,
    },

    #[error("workbook {} contains no sheets", .path.display())]
    NoSheets { path: PathBuf },

    #[error("failed to read sheet {sheet:?}: {source}")]
    Sheet {
        sheet: String,
        source: calamine::XlsxError,
    },
}

/// Sink-level errors. Never fatal: logged where they occur, counted in the
/// strategy outcome, and sibling writers keep going.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to open sink {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to write record to {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, BenchError>;
