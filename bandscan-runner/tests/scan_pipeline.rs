//! Integration tests: config file -> request -> provider -> report -> artifacts.

use std::io::Write;

use bandscan_core::data::{CsvProvider, DataSource, MemoProvider, SyntheticProvider};
use bandscan_core::signals::BandMode;
use bandscan_runner::export::{export_signals_csv, load_artifacts, save_artifacts};
use bandscan_runner::{
    run_scan, run_sweep, DateRange, MultiplierGrid, ScanConfig, ScanError, ScanOutcome,
    ScanRequest,
};
use chrono::{Datelike, NaiveDate, Weekday};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Weekday bars from 2024-01-01 to 2024-06-30, flat at 600 with one surge on 2024-04-15.
fn write_broker_csv() -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "date,open,high,low,close,volume").unwrap();
    let mut date = d(2024, 1, 1);
    while date < d(2024, 7, 1) {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let shares = if date == d(2024, 4, 15) { 90_000_000 } else { 20_000_000 };
            writeln!(f, "{date},600,605,595,600,{shares}").unwrap();
        }
        date += chrono::Duration::days(1);
    }
    f.flush().unwrap();
    f
}

#[test]
fn config_file_drives_csv_scan() {
    let csv = write_broker_csv();
    let config = ScanConfig::from_toml(
        r#"
        [scan]
        symbol = "2330"
        period = "custom"
        start_date = "2024-03-01"
        end_date = "2024-06-01"

        [signal]
        volume_multiplier = 2.0
        band_mode = "near_upper"
        tolerance_pct = 0.0

        [evaluation]
        horizons = [1, 5, 60]
        "#,
    )
    .unwrap();
    let request = config.to_request(d(2025, 1, 1)).unwrap();

    let provider = MemoProvider::new(CsvProvider::new(csv.path()));
    let report = run_scan(&provider, &request).unwrap().completed().unwrap();

    assert_eq!(report.symbol, "2330.TW");
    assert_eq!(report.source, DataSource::CsvImport);
    assert_eq!(report.bars.first().unwrap().date, d(2024, 3, 1));
    assert_eq!(report.bars.last().unwrap().date, d(2024, 5, 31));
    assert_eq!(report.summary.indicator_coverage, 1.0);
    assert_eq!(report.summary.period_return, Some(0.0));

    // Flat closes sit exactly on the collapsed upper band.
    assert_eq!(report.signals.len(), 1);
    let record = &report.signals[0];
    assert_eq!(record.signal.date, d(2024, 4, 15));
    assert_eq!(record.signal.volume, 90_000.0);
    assert_eq!(record.signal.trigger_price, Some(600.0));
    assert_eq!(report.criteria.band_mode, BandMode::NearUpper);

    let h60 = report.performance.get(60).unwrap();
    assert_eq!(h60.sample_count, 0);
    assert_eq!(h60.average_return, None);
    assert_eq!(report.performance.get(5).unwrap().sample_count, 1);

    // Same request again is served by the memo.
    assert_eq!(provider.len(), 1);
    run_scan(&provider, &request).unwrap();
    assert_eq!(provider.len(), 1);

    let csv_out = export_signals_csv(&report).unwrap();
    assert!(csv_out.lines().nth(1).unwrap().starts_with("2024-04-15,600.00,90000.000"));
}

#[test]
fn unknown_symbol_is_reported_not_raised() {
    let csv = write_broker_csv();
    let provider = CsvProvider::new(csv.path());
    let request = ScanRequest::new("2330", DateRange::new(d(2030, 1, 1), d(2030, 6, 1)));
    match run_scan(&provider, &request).unwrap() {
        ScanOutcome::DataUnavailable { symbol, .. } => assert_eq!(symbol, "2330.TW"),
        ScanOutcome::Completed(_) => panic!("expected DataUnavailable"),
    }
}

#[test]
fn inverted_range_never_reaches_provider() {
    let provider = SyntheticProvider::new();
    let request = ScanRequest::new("2330", DateRange::new(d(2024, 6, 1), d(2024, 3, 1)));
    assert!(matches!(
        run_scan(&provider, &request),
        Err(ScanError::InvalidDateRange { .. })
    ));
}

#[test]
fn synthetic_scan_saves_loadable_artifacts() {
    let request = ScanRequest::new("6488.TWO", DateRange::new(d(2023, 1, 1), d(2024, 1, 1)));
    let report = run_scan(&SyntheticProvider::new(), &request)
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(report.symbol, "6488.TWO");

    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&report, dir.path()).unwrap();
    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded.symbol, report.symbol);
    assert_eq!(loaded.bars, report.bars);
    assert_eq!(loaded.signals.len(), report.signals.len());
}

#[test]
fn sweep_matches_individual_scans() {
    let provider = SyntheticProvider::new();
    let request = ScanRequest::new("2317", DateRange::new(d(2023, 1, 1), d(2024, 1, 1)));
    let grid = MultiplierGrid {
        from: 1.5,
        to: 2.5,
        step: 0.5,
    };
    let sweep = run_sweep(&provider, &request, &grid)
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(sweep.points.len(), 3);

    for point in &sweep.points {
        let mut single = request.clone();
        single.criteria.volume_multiplier = point.volume_multiplier;
        let report = run_scan(&provider, &single).unwrap().completed().unwrap();
        assert_eq!(report.summary.signal_count, point.signal_count);
        assert_eq!(report.performance, point.performance);
    }
}
