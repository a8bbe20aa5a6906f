//! BandScan CLI: scan, sweep and preset listing commands.
//!
//! Commands:
//! - `scan`: run one volume-surge scan and print the summary, signal table
//!   and forward-return table; optionally save CSV/JSON/Markdown artifacts
//! - `sweep`: evaluate a range of volume multipliers on one loaded window
//! - `presets`: list the named analysis periods and their resolved ranges

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use bandscan_core::data::{CsvProvider, DataProvider, MemoProvider, SyntheticProvider, YahooProvider};
use bandscan_core::domain::{normalize_symbol, Market};
use bandscan_core::signals::BandMode;
use bandscan_runner::export::{
    export_json, export_signals_csv, export_sweep_csv, format_lots, format_pct, format_ratio,
    save_artifacts,
};
use bandscan_runner::{
    run_scan, run_sweep, MultiplierGrid, PeriodPreset, ScanConfig, ScanOutcome, ScanReport,
    SweepPoint, SweepReport,
};

#[derive(Parser)]
#[command(
    name = "bandscan",
    about = "BandScan: volume surge + Bollinger Band scanner for Taiwan equities"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level: trace, debug, info, warn, error.
    #[arg(long, global = true, default_value = "warn")]
    log_level: Level,
}

/// Options shared by `scan` and `sweep`. Flags override the config file.
#[derive(Args, Clone)]
struct ScanArgs {
    /// Stock code, e.g. 2330, 2330.TW or 6488.TWO (OTC).
    symbol: Option<String>,

    /// Path to a TOML scan config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Period preset: last_year, last_3_years, last_5_years, ai_boom, pandemic, trade_war.
    #[arg(long)]
    period: Option<String>,

    /// Custom start date (YYYY-MM-DD). Requires --end.
    #[arg(long)]
    start: Option<String>,

    /// Custom end date (YYYY-MM-DD, exclusive). Requires --start.
    #[arg(long)]
    end: Option<String>,

    /// Volume must exceed this multiple of its moving average.
    #[arg(long)]
    multiplier: Option<f64>,

    /// Band condition: none, near_upper, near_lower.
    #[arg(long)]
    band_mode: Option<String>,

    /// Band tolerance in percent.
    #[arg(long)]
    tolerance: Option<f64>,

    /// Forward-return horizons in trading days, comma separated.
    #[arg(long, value_delimiter = ',')]
    horizons: Option<Vec<usize>>,

    /// Calendar days of warm-up history fetched before the start date.
    #[arg(long)]
    buffer_days: Option<u32>,

    /// Read bars from a CSV file (date,open,high,low,close,volume) instead of Yahoo.
    #[arg(long)]
    csv_input: Option<PathBuf>,

    /// Use a deterministic synthetic random walk instead of Yahoo.
    #[arg(long, default_value_t = false)]
    synthetic: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one security for volume-surge signals.
    Scan {
        #[command(flatten)]
        args: ScanArgs,

        /// Print the full report as JSON instead of tables.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write the signal table to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Save report.json, signals.csv, indicators.csv and report.md under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Sweep the volume multiplier over a grid.
    Sweep {
        #[command(flatten)]
        args: ScanArgs,

        #[arg(long, default_value_t = 1.0)]
        from: f64,

        #[arg(long, default_value_t = 3.0)]
        to: f64,

        #[arg(long, default_value_t = 0.1)]
        step: f64,

        /// Print the sweep as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write the sweep to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// List period presets with their resolved date ranges.
    Presets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Scan {
            args,
            json,
            csv,
            output_dir,
        } => run_scan_cmd(&args, json, csv, output_dir),
        Commands::Sweep {
            args,
            from,
            to,
            step,
            json,
            csv,
        } => run_sweep_cmd(&args, MultiplierGrid { from, to, step }, json, csv),
        Commands::Presets => run_presets(),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

/// Config file (or defaults) with command-line overrides applied.
fn build_config(args: &ScanArgs) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::from_file(path)?,
        None => ScanConfig::default(),
    };

    if let Some(symbol) = &args.symbol {
        config.scan.symbol = symbol.clone();
    }
    match (&args.start, &args.end) {
        (Some(start), Some(end)) => {
            config.scan.period = "custom".into();
            config.scan.start_date = Some(parse_date(start)?);
            config.scan.end_date = Some(parse_date(end)?);
        }
        (None, None) => {}
        _ => bail!("--start and --end must be given together"),
    }
    if let Some(period) = &args.period {
        if args.start.is_some() {
            bail!("--period and --start/--end are mutually exclusive");
        }
        config.scan.period = period.clone();
    }
    if let Some(multiplier) = args.multiplier {
        config.signal.volume_multiplier = multiplier;
    }
    if let Some(mode) = &args.band_mode {
        config.signal.band_mode = mode.parse::<BandMode>()?;
    }
    if let Some(tolerance) = args.tolerance {
        config.signal.tolerance_pct = tolerance;
    }
    if let Some(horizons) = &args.horizons {
        config.evaluation.horizons = horizons.clone();
    }
    if let Some(days) = args.buffer_days {
        config.scan.buffer_days = days;
    }

    config.validate()?;
    debug!(fingerprint = %config.fingerprint(), "config resolved");
    Ok(config)
}

fn build_provider(args: &ScanArgs) -> Result<Box<dyn DataProvider>> {
    if args.csv_input.is_some() && args.synthetic {
        bail!("--csv-input and --synthetic are mutually exclusive");
    }
    let provider: Box<dyn DataProvider> = match (&args.csv_input, args.synthetic) {
        (Some(path), _) => Box::new(MemoProvider::new(CsvProvider::new(path))),
        (None, true) => Box::new(MemoProvider::new(SyntheticProvider::new())),
        (None, false) => Box::new(MemoProvider::new(YahooProvider::new()?)),
    };
    Ok(provider)
}

fn report_unavailable(symbol: &str, reason: &str) -> Result<()> {
    eprintln!("No data for {symbol}: {reason}");
    if let Ok(ticker) = normalize_symbol(symbol) {
        if ticker.market() == Market::Listed {
            let otc = ticker.with_market(Market::Otc);
            eprintln!("Hint: OTC securities trade under the .TWO suffix; try `{otc}`.");
        }
    }
    bail!("data unavailable for {symbol}")
}

fn run_scan_cmd(
    args: &ScanArgs,
    json: bool,
    csv: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = build_config(args)?;
    let request = config.to_request(today())?;
    let provider = build_provider(args)?;

    let report = match run_scan(provider.as_ref(), &request)? {
        ScanOutcome::Completed(report) => report,
        ScanOutcome::DataUnavailable { symbol, reason } => {
            return report_unavailable(&symbol, &reason)
        }
    };

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(path) = csv {
        std::fs::write(&path, export_signals_csv(&report)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Signals written to: {}", path.display());
    }
    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&report, &dir)?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn run_sweep_cmd(
    args: &ScanArgs,
    grid: MultiplierGrid,
    json: bool,
    csv: Option<PathBuf>,
) -> Result<()> {
    let config = build_config(args)?;
    let request = config.to_request(today())?;
    let provider = build_provider(args)?;

    let report = match run_sweep(provider.as_ref(), &request, &grid)? {
        ScanOutcome::Completed(report) => report,
        ScanOutcome::DataUnavailable { symbol, reason } => {
            return report_unavailable(&symbol, &reason)
        }
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize sweep")?
        );
    } else {
        print_sweep(&report, &request.horizons);
    }

    if let Some(path) = csv {
        std::fs::write(&path, export_sweep_csv(&report)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Sweep written to: {}", path.display());
    }

    Ok(())
}

fn run_presets() -> Result<()> {
    let today = today();
    println!("{:<14} {:<32} Range", "Preset", "Description");
    println!("{}", "-".repeat(72));
    for preset in PeriodPreset::NAMED {
        println!(
            "{:<14} {:<32} {}",
            preset.name(),
            preset.description(),
            preset.resolve(today)
        );
    }
    println!();
    println!("Use --start/--end for a custom range.");
    Ok(())
}

fn print_report(report: &ScanReport) {
    let summary = &report.summary;

    println!();
    println!("=== {} ===", report.symbol);
    println!("Window:           {} ({} bars, source {})", report.range, summary.bars, report.source);
    println!("Period return:    {}", format_pct(summary.period_return));
    println!("Signals:          {}", summary.signal_count);
    println!(
        "Latest BB width:  {}",
        summary
            .latest_width
            .map(|w| format!("{w:.2}"))
            .unwrap_or_else(|| "-".into())
    );
    println!(
        "Criteria:         volume > {}x avg, band {} (tolerance {}%)",
        report.criteria.volume_multiplier, report.criteria.band_mode, report.criteria.tolerance_pct
    );
    if summary.insufficient_history() {
        println!();
        println!(
            "Not enough history: the first {} bars of a window are needed before bands are defined.",
            report.params.window.max(report.params.volume_window)
        );
    }

    println!();
    if report.signals.is_empty() {
        println!("No bars matched the criteria.");
    } else {
        println!(
            "{:<12} {:>10} {:>14} {:>14} {:>8} {:>10}",
            "Date", "Close", "Volume", "Avg volume", "Ratio", "BB width"
        );
        println!("{}", "-".repeat(73));
        for record in &report.signals {
            let s = &record.signal;
            println!(
                "{:<12} {:>10.2} {:>14} {:>14} {:>8} {:>10}",
                s.date.to_string(),
                s.close,
                format_lots(s.volume),
                format_lots(s.vol_ma),
                format_ratio(s.volume_ratio),
                s.bb_width.map(|w| format!("{w:.2}")).unwrap_or_else(|| "-".into())
            );
        }
    }

    println!();
    println!("{:>8} {:>8} {:>10} {:>10}", "Horizon", "Samples", "Average", "Win rate");
    println!("{}", "-".repeat(39));
    for stats in report.performance.iter() {
        println!(
            "{:>7}d {:>8} {:>10} {:>10}",
            stats.horizon,
            stats.sample_count,
            format_pct(stats.average_return),
            format_pct(stats.win_rate)
        );
    }
}

fn print_sweep(report: &SweepReport, horizons: &[usize]) {
    println!();
    println!("=== {} {} ===", report.symbol, report.range);

    let mut header = format!("{:>6} {:>8}", "Mult", "Signals");
    for h in horizons {
        header.push_str(&format!(" {:>10} {:>8}", format!("avg {h}d"), "win"));
    }
    println!("{header}");
    println!("{}", "-".repeat(header.len()));

    for point in &report.points {
        println!("{}", sweep_row(point, horizons));
    }
}

fn sweep_row(point: &SweepPoint, horizons: &[usize]) -> String {
    let mut line = format!("{:>5.2}x {:>8}", point.volume_multiplier, point.signal_count);
    for h in horizons {
        let stats = point.performance.get(*h);
        line.push_str(&format!(
            " {:>10} {:>8}",
            format_pct(stats.and_then(|s| s.average_return)),
            format_pct(stats.and_then(|s| s.win_rate))
        ));
    }
    line
}
