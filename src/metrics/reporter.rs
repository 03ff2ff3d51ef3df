//! Comparison reporting and export
//!
//! Renders the strategy comparison table and statistics block on the
//! console, and exports the collected records as JSON or CSV.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use super::recorder::PerformanceRecord;
use crate::utils::format_count;

/// One exported row, with the derived fields materialized.
#[derive(Serialize)]
struct ReportRow<'a> {
    method: &'a str,
    duration_secs: f64,
    rows_handled: usize,
    rows_per_sec: f64,
    memory_used_bytes: u64,
    memory_mb: f64,
}

impl<'a> From<&'a PerformanceRecord> for ReportRow<'a> {
    fn from(r: &'a PerformanceRecord) -> Self {
        Self {
            method: r.method.as_str(),
            duration_secs: r.duration_secs(),
            rows_handled: r.rows_handled,
            rows_per_sec: r.rows_per_sec(),
            memory_used_bytes: r.memory_used_bytes,
            memory_mb: r.memory_mb(),
        }
    }
}

/// Print the comparison table.
pub fn print_comparison(records: &[PerformanceRecord]) {
    println!("\n=== Performance Comparison ===");
    println!(
        "{:<12} {:>12} {:>15} {:>14}",
        "Method", "Duration", "Rows/Second", "Memory (MB)"
    );
    println!("{}", "-".repeat(56));

    for record in records {
        println!(
            "{:<12} {:>12} {:>15} {:>14.2}",
            record.method.as_str(),
            format_duration(record.duration()),
            format_count(record.rows_per_sec() as u64),
            record.memory_mb()
        );
    }
}

/// Print the statistics block: duration spread and per-method speedup
/// relative to the fastest run.
pub fn print_statistics(records: &[PerformanceRecord]) {
    if records.is_empty() {
        return;
    }

    let durations: Vec<f64> = records.iter().map(|r| r.duration_secs()).collect();

    println!("\nStatistics:");
    println!("  mean duration:   {:.6}s", mean(&durations));
    println!("  median duration: {:.6}s", median(&durations));
    if durations.len() >= 2 {
        let var = variance(&durations);
        println!("  variance:        {:.6}", var);
        println!("  std deviation:   {:.6}", var.sqrt());
    }

    let fastest = durations.iter().cloned().fold(f64::INFINITY, f64::min);
    println!("\nRelative performance:");
    for (record, secs) in records.iter().zip(&durations) {
        println!(
            "  {:<12} {:.6}s (speedup {:.2}x)",
            record.method.as_str(),
            secs,
            fastest / secs
        );
    }
}

/// Export all records to a JSON file.
pub fn write_json_file(
    path: &Path,
    records: &[PerformanceRecord],
    config_summary: &str,
) -> io::Result<()> {
    let rows: Vec<ReportRow<'_>> = records.iter().map(ReportRow::from).collect();
    let json = serde_json::json!({
        "config": config_summary,
        "strategies": rows,
    });

    let mut file = File::create(path)?;
    writeln!(file, "{}", serde_json::to_string_pretty(&json).unwrap())?;
    Ok(())
}

/// CSV header matching `to_csv_row`.
pub fn csv_header() -> &'static str {
    "method,duration_secs,rows_handled,rows_per_sec,memory_mb"
}

/// One record as a CSV row.
pub fn to_csv_row(record: &PerformanceRecord) -> String {
    format!(
        "{},{:.6},{},{:.2},{:.2}",
        record.method.as_str(),
        record.duration_secs(),
        record.rows_handled,
        record.rows_per_sec(),
        record.memory_mb()
    )
}

/// Export all records to a CSV file.
pub fn write_csv_file(path: &Path, records: &[PerformanceRecord]) -> io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "{}", csv_header())?;
    for record in records {
        writeln!(file, "{}", to_csv_row(record))?;
    }
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 1.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.2}ms", secs * 1000.0)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample variance (n - 1 denominator); callers guard `len >= 2`.
fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::WriteMethod;
    use std::time::Instant;

    fn record(method: WriteMethod, secs: u64, rows: usize) -> PerformanceRecord {
        let start_time = Instant::now();
        PerformanceRecord {
            method,
            start_time,
            end_time: start_time + Duration::from_secs(secs),
            rows_handled: rows,
            memory_used_bytes: 8 * 1024 * 1024,
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250.00ms");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.00s");
    }

    #[test]
    fn test_mean_median_variance() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((mean(&values) - 2.5).abs() < f64::EPSILON);
        assert!((median(&values) - 2.5).abs() < f64::EPSILON);
        assert!((median(&[1.0, 2.0, 9.0]) - 2.0).abs() < f64::EPSILON);
        // Sample variance of 1..4 is 5/3.
        assert!((variance(&values) - 5.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_csv_row_shape() {
        let r = record(WriteMethod::Batch, 2, 1000);
        let row = to_csv_row(&r);
        assert!(row.starts_with("batch,2.000000,1000,500.00,"));
        assert_eq!(row.split(',').count(), csv_header().split(',').count());
    }

    #[test]
    fn test_json_export_materializes_derived_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let records = vec![
            record(WriteMethod::Sequential, 1, 1000),
            record(WriteMethod::Batch, 2, 1000),
        ];

        write_json_file(&path, &records, "test config").unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["config"], "test config");
        let strategies = parsed["strategies"].as_array().unwrap();
        assert_eq!(strategies.len(), 2);
        assert_eq!(strategies[0]["method"], "sequential");
        assert!((strategies[0]["rows_per_sec"].as_f64().unwrap() - 1000.0).abs() < 0.01);
        assert!((strategies[1]["memory_mb"].as_f64().unwrap() - 8.0).abs() < 0.01);
    }

    #[test]
    fn test_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let records = vec![record(WriteMethod::Concurrent, 1, 500)];

        write_csv_file(&path, &records).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], csv_header());
        assert!(lines[1].starts_with("concurrent,"));
    }
}
