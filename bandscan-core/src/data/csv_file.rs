//! CSV import provider for offline analysis.
//!
//! Expected header: `date,open,high,low,close,volume` with ISO dates and
//! volume counted in shares (as exported by most brokers). Extra columns are
//! ignored. Rows may be in any order; duplicates keep the first occurrence.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::PriceBar;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Serves a single security's history from a CSV file.
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_bars(&self) -> Result<Vec<PriceBar>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DataError::Csv(format!("{}: {e}", self.path.display())))?;

        reader
            .deserialize::<CsvRow>()
            .enumerate()
            .map(|(line, row)| {
                let row = row.map_err(|e| DataError::Csv(format!("row {}: {e}", line + 2)))?;
                if row.volume < 0.0 || !row.volume.is_finite() {
                    return Err(DataError::Csv(format!(
                        "row {}: invalid volume {}",
                        line + 2,
                        row.volume
                    )));
                }
                Ok(PriceBar::from_raw(
                    row.date,
                    row.open,
                    row.high,
                    row.low,
                    row.close,
                    row.volume.round() as u64,
                ))
            })
            .collect()
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = self.read_bars()?;
        debug!(path = %self.path.display(), rows = bars.len(), "csv rows read");
        let fetched = FetchResult::from_bars(symbol, bars, start, end, DataSource::CsvImport)?;
        if !fetched.cleaning.is_clean() {
            warn!(
                symbol,
                duplicates = fetched.cleaning.duplicates_dropped,
                invalid = fetched.cleaning.invalid_dropped,
                "csv rows dropped during canonicalization"
            );
        }
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn reads_and_filters_range() {
        let f = write_csv(
            "date,open,high,low,close,volume\n\
             2024-01-04,100,102,99,101,2000000\n\
             2024-01-02,98,100,97,99,1500000\n\
             2024-01-03,99,101,98,100,1000000\n",
        );
        let provider = CsvProvider::new(f.path());
        let fetched = provider.fetch("2330.TW", d(2024, 1, 3), d(2024, 2, 1)).unwrap();
        let dates: Vec<_> = fetched.series.dates().collect();
        assert_eq!(dates, vec![d(2024, 1, 3), d(2024, 1, 4)]);
        assert_eq!(fetched.series.get(0).unwrap().volume, 1000.0);
        assert_eq!(fetched.source, DataSource::CsvImport);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let f = write_csv(
            "date,open,high,low,close,adj_close,volume\n\
             2024-01-02,98,100,97,99,98.5,1500000\n",
        );
        let fetched = CsvProvider::new(f.path())
            .fetch("X", d(2024, 1, 1), d(2024, 1, 3))
            .unwrap();
        assert_eq!(fetched.series.len(), 1);
    }

    #[test]
    fn malformed_row_is_csv_error() {
        let f = write_csv("date,open,high,low,close,volume\nnot-a-date,1,1,1,1,1\n");
        let err = CsvProvider::new(f.path())
            .fetch("X", d(2024, 1, 1), d(2024, 2, 1))
            .unwrap_err();
        assert!(matches!(err, DataError::Csv(msg) if msg.contains("row 2")));
    }

    #[test]
    fn missing_file_is_csv_error() {
        let err = CsvProvider::new("/nonexistent/bandscan.csv")
            .fetch("X", d(2024, 1, 1), d(2024, 2, 1))
            .unwrap_err();
        assert!(matches!(err, DataError::Csv(_)));
    }

    #[test]
    fn empty_range_is_no_data() {
        let f = write_csv("date,open,high,low,close,volume\n2024-01-02,98,100,97,99,1\n");
        let err = CsvProvider::new(f.path())
            .fetch("X", d(2025, 1, 1), d(2025, 2, 1))
            .unwrap_err();
        assert!(matches!(err, DataError::NoData { .. }));
    }
}
