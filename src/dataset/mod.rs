//! Dataset loading and access
//!
//! The row source for the benchmark: loads the first worksheet of an .xlsx
//! file into an ordered, in-memory sequence of string records. The header
//! row is discarded before any record is visible to the rest of the system.

use std::path::Path;

use calamine::{open_workbook, Reader, Xlsx};

use crate::utils::SourceError;

/// A single input row: an ordered sequence of string fields.
pub type Record = Vec<String>;

/// An ordered, immutable sequence of records.
///
/// Order is preserved from the source; the dataset is never mutated after
/// loading. Strategies borrow records from here for the lifetime of a run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<Record>,
}

impl Dataset {
    /// Build a dataset from already-materialized rows (used by tests and
    /// by any non-spreadsheet source).
    pub fn from_rows(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow the full record sequence in source order.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// One-line description for logging.
    pub fn summary(&self) -> String {
        let width = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        format!(
            "Dataset: {} records, {} columns (widest row)",
            self.rows.len(),
            width
        )
    }
}

/// Load the first worksheet of an .xlsx workbook.
///
/// The first row is treated as a header and skipped; every remaining cell
/// is rendered to its display string, matching the way spreadsheet tools
/// export row data. A missing file or wrong extension fails fast, before
/// any strategy runs.
pub fn load_xlsx(path: &Path) -> Result<Dataset, SourceError> {
    let xlsx_ext = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if !xlsx_ext {
        return Err(SourceError::WrongExtension {
            path: path.to_path_buf(),
        });
    }
    if !path.exists() {
        return Err(SourceError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| SourceError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SourceError::NoSheets {
            path: path.to_path_buf(),
        })?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| SourceError::Sheet {
            sheet: sheet.clone(),
            source: e,
        })?;

    let rows = range
        .rows()
        .skip(1) // header row
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    Ok(Dataset::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> Record {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_rows_preserves_order() {
        let ds = Dataset::from_rows(vec![record(&["a", "1"]), record(&["b", "2"])]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[0], record(&["a", "1"]));
        assert_eq!(ds.rows()[1], record(&["b", "2"]));
    }

    #[test]
    fn test_empty_dataset() {
        let ds = Dataset::default();
        assert!(ds.is_empty());
        assert_eq!(ds.len(), 0);
    }

    #[test]
    fn test_load_rejects_wrong_extension() {
        let err = load_xlsx(std::path::Path::new("input.csv")).unwrap_err();
        assert!(matches!(err, SourceError::WrongExtension { .. }));
    }

    #[test]
    fn test_load_rejects_missing_file() {
        let err = load_xlsx(std::path::Path::new("no-such-file.xlsx")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }

    #[test]
    fn test_summary_reports_counts() {
        let ds = Dataset::from_rows(vec![record(&["a"]), record(&["b", "c", "d"])]);
        let summary = ds.summary();
        assert!(summary.contains("2 records"));
        assert!(summary.contains("3 columns"));
    }
}
