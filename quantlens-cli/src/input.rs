//! Price file loading.
//!
//! `.json` files hold a [`PriceSeriesRecord`]. Anything else is read as CSV
//! with a `date,close` header and optional `high`, `low` and `volume`
//! columns; the ticker is the upper-cased file stem.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use quantlens_core::{PriceSeries, PriceSeriesRecord, ValidationError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    close: f64,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

/// Read a file into an unchecked record.
pub fn load_record(path: &Path) -> Result<PriceSeriesRecord> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("invalid price JSON in {}", path.display()))
    } else {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<CsvRow>, _>>()
            .with_context(|| format!("invalid price CSV in {}", path.display()))?;
        let record = record_from_rows(ticker_from_path(path), rows)
            .with_context(|| format!("invalid price CSV in {}", path.display()))?;
        Ok(record)
    }
}

/// Read a file and run the construction checks.
pub fn load_series(path: &Path) -> Result<PriceSeries> {
    let record = load_record(path)?;
    PriceSeries::from_record(record).with_context(|| format!("rejected price data in {}", path.display()))
}

fn ticker_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_default()
}

fn record_from_rows(ticker: String, rows: Vec<CsvRow>) -> Result<PriceSeriesRecord, ValidationError> {
    let n = rows.len();
    let mut dates = Vec::with_capacity(n);
    let mut close = Vec::with_capacity(n);
    let mut high = Vec::with_capacity(n);
    let mut low = Vec::with_capacity(n);
    let mut volume = Vec::with_capacity(n);

    for (index, row) in rows.into_iter().enumerate() {
        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d").map_err(|_| {
            ValidationError::InvalidDate {
                index,
                value: row.date.clone(),
            }
        })?;
        dates.push(date);
        close.push(row.close);
        high.extend(row.high);
        low.extend(row.low);
        volume.extend(row.volume);
    }

    // A column present on some rows only keeps its short length and fails
    // construction with a length mismatch.
    let optional = |values: Vec<f64>| (!values.is_empty()).then_some(values);

    Ok(PriceSeriesRecord {
        ticker,
        dates,
        close,
        high: optional(high),
        low: optional(low),
        volume: optional(volume),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_with_range_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "spy.csv",
            "date,close,high,low,volume\n2024-01-02,100.0,101.0,99.0,1000\n2024-01-03,101.5,102.0,100.5,1200\n",
        );
        let series = load_series(&path).unwrap();
        assert_eq!(series.ticker(), "SPY");
        assert_eq!(series.len(), 2);
        assert!(series.has_range());
        assert_eq!(series.volumes().map(|v| v.len()), Some(2));
    }

    #[test]
    fn csv_close_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "qqq.csv", "date,close\n2024-01-02,400\n2024-01-03,402\n");
        let record = load_record(&path).unwrap();
        assert_eq!(record.close, vec![400.0, 402.0]);
        assert!(record.high.is_none());
        assert!(record.volume.is_none());
    }

    #[test]
    fn csv_bad_date_names_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.csv", "date,close\n2024-01-02,10\n01/03/2024,11\n");
        let err = load_record(&path).unwrap_err();
        let source = err.downcast_ref::<ValidationError>().unwrap();
        assert_eq!(
            source,
            &ValidationError::InvalidDate {
                index: 1,
                value: "01/03/2024".into(),
            }
        );
    }

    #[test]
    fn csv_partial_high_column_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "gap.csv",
            "date,close,high,low\n2024-01-02,10,11,9\n2024-01-03,11,,\n",
        );
        let err = load_series(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::LengthMismatch { field: "high", .. })
        ));
    }

    #[test]
    fn json_record_keeps_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "prices.json",
            r#"{"ticker":"AAPL","dates":["2024-01-02","2024-01-03"],"close":[185.0,184.2]}"#,
        );
        let series = load_series(&path).unwrap();
        assert_eq!(series.ticker(), "AAPL");
    }
}
