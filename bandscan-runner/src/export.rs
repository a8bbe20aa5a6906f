//! Reporting and export: JSON, CSV and Markdown artifacts.
//!
//! Provides the export formats for scan results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: signal table and per-bar indicator table
//! - **Markdown**: human-readable single-scan report
//!
//! Display helpers (thousands separators, ratio and percent formatting) live
//! here too so the CLI and the Markdown report format numbers the same way.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::runner::{ScanReport, SCHEMA_VERSION};
use crate::sweep::SweepReport;

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ScanReport to JSON")
}

/// Deserialize a `ScanReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ScanReport> {
    let report: ScanReport =
        serde_json::from_str(json).context("failed to deserialize ScanReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt(v: Option<f64>, precision: usize) -> String {
    v.map(|x| format!("{x:.precision$}")).unwrap_or_default()
}

/// Signal table with one forward-return column per horizon.
///
/// Columns: date, close, volume_lots, vol_ma_lots, volume_ratio, bb_width,
/// trigger_price, marker, ret_{h}...
pub fn export_signals_csv(report: &ScanReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<String> = [
        "date",
        "close",
        "volume_lots",
        "vol_ma_lots",
        "volume_ratio",
        "bb_width",
        "trigger_price",
        "marker",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(report.horizons.iter().map(|h| format!("ret_{h}")));
    wtr.write_record(&header)?;

    for record in &report.signals {
        let s = &record.signal;
        let mut row = vec![
            s.date.to_string(),
            format!("{:.2}", s.close),
            format!("{:.3}", s.volume),
            format!("{:.3}", s.vol_ma),
            format!("{:.4}", s.volume_ratio),
            opt(s.bb_width, 4),
            opt(s.trigger_price, 4),
            format!("{:.2}", record.marker),
        ];
        row.extend(
            report
                .horizons
                .iter()
                .map(|h| opt(record.forward_returns.get(h).copied().flatten(), 6)),
        );
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Per-bar table of prices and indicators; undefined values are empty cells.
pub fn export_indicators_csv(report: &ScanReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "open",
        "high",
        "low",
        "close",
        "volume_lots",
        "bb_mid",
        "bb_high",
        "bb_low",
        "bb_width",
        "vol_ma_lots",
    ])?;

    for (bar, row) in report.bars.iter().zip(&report.indicators) {
        wtr.write_record([
            bar.date.to_string(),
            format!("{:.2}", bar.open),
            format!("{:.2}", bar.high),
            format!("{:.2}", bar.low),
            format!("{:.2}", bar.close),
            format!("{:.3}", bar.volume),
            opt(row.bb_mid(), 4),
            opt(row.bb_high(), 4),
            opt(row.bb_low(), 4),
            opt(row.bb_width(), 4),
            opt(row.vol_ma, 3),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per (multiplier, horizon).
pub fn export_sweep_csv(report: &SweepReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "volume_multiplier",
        "signal_count",
        "horizon",
        "sample_count",
        "average_return",
        "win_rate",
    ])?;
    for point in &report.points {
        for stats in point.performance.iter() {
            wtr.write_record([
                format!("{:.2}", point.volume_multiplier),
                point.signal_count.to_string(),
                stats.horizon.to_string(),
                stats.sample_count.to_string(),
                opt(stats.average_return, 6),
                opt(stats.win_rate, 4),
            ])?;
        }
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single scan.
///
/// Creates a directory named `{symbol}_{timestamp}/` under `output_dir`
/// containing:
/// - `report.json`: the full `ScanReport`
/// - `signals.csv`: signal table with forward returns
/// - `indicators.csv`: bar-by-bar prices and indicators
/// - `report.md`: Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &ScanReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.symbol,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)?;
    std::fs::write(run_dir.join("signals.csv"), export_signals_csv(report)?)?;
    std::fs::write(run_dir.join("indicators.csv"), export_indicators_csv(report)?)?;
    std::fs::write(run_dir.join("report.md"), generate_report(report))?;

    Ok(run_dir)
}

/// Load a `ScanReport` from an artifact directory's report.json.
pub fn load_artifacts(dir: &Path) -> Result<ScanReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

pub fn generate_report(report: &ScanReport) -> String {
    let mut md = String::with_capacity(2048);
    let summary = &report.summary;

    md.push_str(&format!("# {} Volume Surge Scan\n\n", report.symbol));
    md.push_str("| Field | Value |\n| --- | --- |\n");
    md.push_str(&format!("| Window | {} |\n", report.range));
    md.push_str(&format!("| Source | {} |\n", report.source));
    md.push_str(&format!(
        "| Bollinger | {} bars, {}σ, {:?} |\n",
        report.params.window, report.params.std_multiplier, report.params.std_dev
    ));
    md.push_str(&format!(
        "| Criteria | volume > {}x {}-bar average, band {} (tolerance {}%) |\n",
        report.criteria.volume_multiplier,
        report.params.volume_window,
        report.criteria.band_mode,
        report.criteria.tolerance_pct
    ));
    md.push_str(&format!("| Period return | {} |\n", format_pct(summary.period_return)));
    md.push_str(&format!("| Signals | {} |\n", summary.signal_count));
    md.push_str(&format!(
        "| Latest band width | {} |\n",
        summary
            .latest_width
            .map(|w| format!("{w:.2}"))
            .unwrap_or_else(|| "-".into())
    ));
    md.push('\n');

    if summary.insufficient_history() {
        md.push_str("> Not enough history to compute indicators in this window.\n\n");
    }

    md.push_str("## Signals\n\n");
    if report.signals.is_empty() {
        md.push_str("No bars matched the criteria.\n\n");
    } else {
        md.push_str("| Date | Close | Volume (lots) | Avg volume | Ratio | Band width |\n");
        md.push_str("| --- | ---: | ---: | ---: | ---: | ---: |\n");
        for record in &report.signals {
            let s = &record.signal;
            md.push_str(&format!(
                "| {} | {:.2} | {} | {} | {} | {} |\n",
                s.date,
                s.close,
                format_lots(s.volume),
                format_lots(s.vol_ma),
                format_ratio(s.volume_ratio),
                s.bb_width.map(|w| format!("{w:.2}")).unwrap_or_else(|| "-".into())
            ));
        }
        md.push('\n');
    }

    md.push_str("## Forward Returns\n\n");
    md.push_str("| Horizon | Samples | Average | Win rate |\n");
    md.push_str("| ---: | ---: | ---: | ---: |\n");
    for stats in report.performance.iter() {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            stats.horizon,
            stats.sample_count,
            format_pct(stats.average_return),
            format_pct(stats.win_rate)
        ));
    }
    md.push('\n');

    md
}

// ─── Display helpers ────────────────────────────────────────────────

/// Whole lots with thousands separators: `1234567.4` -> `1,234,567`.
pub fn format_lots(lots: f64) -> String {
    let rounded = lots.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `2.345` -> `2.35x`.
pub fn format_ratio(ratio: f64) -> String {
    format!("{ratio:.2}x")
}

/// Fraction as a signed percentage, `-` when undefined.
pub fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.2}%", v * 100.0),
        None => "-".to_string(),
    }
}
