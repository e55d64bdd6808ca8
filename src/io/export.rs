//! Export a price series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::PriceSeries;
use crate::error::AppError;

pub const CSV_HEADER: &str = "date,open,high,low,close,adj_close,volume";

/// Write every row of `series` to a CSV file. Absent values are empty cells.
pub fn write_series_csv(path: &Path, series: &PriceSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{CSV_HEADER}")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in series.rows() {
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            r.date,
            cell(r.open),
            cell(r.high),
            cell(r.low),
            cell(r.close),
            cell(r.adj_close),
            r.volume.map(|v| v.to_string()).unwrap_or_default(),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    tracing::info!(path = %path.display(), rows = series.len(), "exported series");
    Ok(())
}

fn cell(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.4}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::{PriceRow, Symbol};

    #[test]
    fn writes_header_and_rows_with_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gld.csv");
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        let series = PriceSeries::new(
            Symbol::parse("GLD").unwrap(),
            vec![
                PriceRow {
                    date: d(2),
                    open: Some(240.1),
                    high: Some(242.0),
                    low: Some(239.5),
                    close: Some(241.3),
                    adj_close: None,
                    volume: Some(8_100_000),
                },
                PriceRow::close_only(d(3), None),
            ],
        );

        write_series_csv(&path, &series).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let expected = concat!(
            "date,open,high,low,close,adj_close,volume\n",
            "2025-01-02,240.1000,242.0000,239.5000,241.3000,,8100000\n",
            "2025-01-03,,,,,,\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn unwritable_path_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("gld.csv");
        let series = PriceSeries::empty(Symbol::parse("GLD").unwrap());
        let err = write_series_csv(&path, &series).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
