//! CSV output sinks
//!
//! Every strategy writes two sinks named `VA_<method>.csv` and
//! `VB_<method>.csv` in the output directory. Rows are comma-delimited
//! with minimal quoting and no header. A record is always encoded to one
//! line and issued as a single `write_all`, so append-mode handles held by
//! concurrent workers can interleave rows but never corrupt one.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::utils::SinkError;

/// Partition labels carried into the sink file names.
pub const PARTITION_A: &str = "VA";
pub const PARTITION_B: &str = "VB";

/// The pair of sink paths for one strategy run.
#[derive(Debug, Clone)]
pub struct SinkPaths {
    pub a: PathBuf,
    pub b: PathBuf,
}

impl SinkPaths {
    /// Sink naming convention: `<PartitionLabel>_<method>.csv`.
    pub fn for_method(out_dir: &Path, method: &str) -> Self {
        Self {
            a: out_dir.join(format!("{}_{}.csv", PARTITION_A, method)),
            b: out_dir.join(format!("{}_{}.csv", PARTITION_B, method)),
        }
    }

    /// Discard prior sink files from an earlier run of the same method.
    ///
    /// Removes both files if present so append-mode writers never inherit
    /// stale rows. Missing files are not an error.
    pub fn reset(&self) -> io::Result<()> {
        for path in [&self.a, &self.b] {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

enum SinkWriter {
    Plain(File),
    Buffered(BufWriter<File>),
}

/// An open CSV sink.
pub struct CsvSink {
    path: PathBuf,
    writer: SinkWriter,
}

impl CsvSink {
    /// Create the sink fresh, truncating any existing file.
    ///
    /// `buffered` wraps the file in a `BufWriter`; only single-writer
    /// sinks may use this, since buffer flushes can split a row across
    /// two syscalls.
    pub fn create(path: &Path, buffered: bool) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(|e| SinkError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        let writer = if buffered {
            SinkWriter::Buffered(BufWriter::new(file))
        } else {
            SinkWriter::Plain(file)
        };
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    /// Open the sink in append mode, creating it if absent.
    ///
    /// Always unbuffered: each record is one `write_all` on an `O_APPEND`
    /// handle, which is what keeps concurrent appends row-atomic.
    pub fn append(path: &Path) -> Result<Self, SinkError> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| SinkError::Open {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: SinkWriter::Plain(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encode and write one record as a single line.
    pub fn write_record(&mut self, fields: &[String]) -> Result<(), SinkError> {
        let line = encode_record(fields);
        let result = match &mut self.writer {
            SinkWriter::Plain(file) => file.write_all(line.as_bytes()),
            SinkWriter::Buffered(buf) => buf.write_all(line.as_bytes()),
        };
        result.map_err(|e| SinkError::Write {
            path: self.path.clone(),
            source: e,
        })
    }

    pub fn flush(&mut self) -> Result<(), SinkError> {
        let result = match &mut self.writer {
            SinkWriter::Plain(file) => file.flush(),
            SinkWriter::Buffered(buf) => buf.flush(),
        };
        result.map_err(|e| SinkError::Write {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Encode a record as one comma-delimited line, quoting only fields that
/// contain a delimiter, quote, or line break.
pub fn encode_record(fields: &[String]) -> String {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            line.push('"');
            for c in field.chars() {
                if c == '"' {
                    line.push('"');
                }
                line.push(c);
            }
            line.push('"');
        } else {
            line.push_str(field);
        }
    }
    line.push('\n');
    line
}
