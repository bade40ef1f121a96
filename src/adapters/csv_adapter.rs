//! CSV file data adapter.
//!
//! Columns are located by header name (`timestamp`, `open`, `high`, `low`,
//! `close`, case-insensitive); extra columns are ignored. Duplicate timestamps
//! keep their first row and the result is sorted chronologically.

use crate::domain::error::AlgoTraderError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::path::PathBuf;

const REQUIRED_COLUMNS: [&str; 5] = ["timestamp", "open", "high", "low", "close"];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Epoch milliseconds, `YYYY-MM-DD HH:MM:SS`, RFC 3339, or a bare date.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if !value.is_empty() && value.trim_start_matches('-').bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = value.parse().ok()?;
        return DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn parse_price(
    record: &csv::StringRecord,
    index: usize,
    column: &str,
    row: usize,
) -> Result<f64, AlgoTraderError> {
    let raw = record.get(index).unwrap_or("");
    raw.parse().map_err(|_| AlgoTraderError::Data {
        reason: format!("row {}: invalid {} value '{}'", row, column, raw),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self) -> Result<Vec<PriceBar>, AlgoTraderError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| AlgoTraderError::Data {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            })?;

        let headers = rdr.headers().map_err(|e| AlgoTraderError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;
        let mut indices = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(column))
                .ok_or_else(|| AlgoTraderError::MissingColumn {
                    column: column.to_string(),
                })?;
        }
        let [ts_idx, open_idx, high_idx, low_idx, close_idx] = indices;

        let mut bars = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let row = i + 1;
            let record = result.map_err(|e| AlgoTraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let raw_ts = record.get(ts_idx).unwrap_or("");
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| AlgoTraderError::Data {
                reason: format!("row {}: invalid timestamp '{}'", row, raw_ts),
            })?;

            bars.push(PriceBar {
                timestamp,
                open: parse_price(&record, open_idx, "open", row)?,
                high: parse_price(&record, high_idx, "high", row)?,
                low: parse_price(&record, low_idx, "low", row)?,
                close: parse_price(&record, close_idx, "close", row)?,
            });
        }

        let read = bars.len();
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        if bars.len() < read {
            tracing::warn!(
                dropped = read - bars.len(),
                path = %self.path.display(),
                "dropped rows with duplicate timestamps"
            );
        }
        tracing::info!(bars = bars.len(), path = %self.path.display(), "loaded price data");
        Ok(bars)
    }

    fn source(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn fetch_bars_returns_correct_data() {
        let (_dir, path) = write_csv(
            "timestamp,open,high,low,close,volume\n\
             2024-01-15 00:00:00,100.0,110.0,90.0,105.0,50000\n\
             2024-01-15 04:00:00,105.0,115.0,100.0,110.0,60000\n",
        );
        let bars = CsvAdapter::new(path).fetch_bars().unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp, ts("2024-01-15 00:00:00"));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[1].close, 110.0);
    }

    #[test]
    fn columns_found_by_name_in_any_order() {
        let (_dir, path) = write_csv(
            "Close,Low,High,Open,Timestamp\n\
             105.0,90.0,110.0,100.0,2024-01-15\n",
        );
        let bars = CsvAdapter::new(path).fetch_bars().unwrap();
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].timestamp, ts("2024-01-15 00:00:00"));
    }

    #[test]
    fn missing_close_column_fails() {
        let (_dir, path) = write_csv("timestamp,open,high,low\n2024-01-15,1,2,0.5\n");
        let err = CsvAdapter::new(path).fetch_bars().unwrap_err();
        assert!(matches!(err, AlgoTraderError::MissingColumn { column } if column == "close"));
    }

    #[test]
    fn duplicates_dropped_and_sorted() {
        let (_dir, path) = write_csv(
            "timestamp,open,high,low,close\n\
             2024-01-17,3,3,3,3\n\
             2024-01-15,1,1,1,1\n\
             2024-01-16,2,2,2,2\n\
             2024-01-15,9,9,9,9\n",
        );
        let bars = CsvAdapter::new(path).fetch_bars().unwrap();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn invalid_price_reports_row() {
        let (_dir, path) = write_csv(
            "timestamp,open,high,low,close\n\
             2024-01-15,1,1,1,1\n\
             2024-01-16,2,2,2,abc\n",
        );
        let err = CsvAdapter::new(path).fetch_bars().unwrap_err();
        match err {
            AlgoTraderError::Data { reason } => {
                assert!(reason.contains("row 2"), "{}", reason);
                assert!(reason.contains("close"), "{}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_file_fails() {
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent/prices.csv"));
        assert!(matches!(
            adapter.fetch_bars(),
            Err(AlgoTraderError::Data { .. })
        ));
    }

    #[test]
    fn header_only_file_is_empty() {
        let (_dir, path) = write_csv("timestamp,open,high,low,close\n");
        assert!(CsvAdapter::new(path).fetch_bars().unwrap().is_empty());
    }

    #[test]
    fn timestamp_formats() {
        let expected = ts("2024-01-15 04:00:00");
        assert_eq!(parse_timestamp("1705291200000"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 04:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T04:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T06:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15"), Some(ts("2024-01-15 00:00:00")));
        assert_eq!(parse_timestamp("15/01/2024"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn source_is_path() {
        let adapter = CsvAdapter::new(PathBuf::from("data/btc.csv"));
        assert_eq!(adapter.source(), "data/btc.csv");
    }
}
