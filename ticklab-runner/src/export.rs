//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for backtest results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade tape and per-tick timeline for external analysis tools
//! - **Markdown**: a human-readable single-run report
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use ticklab_core::{TimelinePoint, TradeRecord};

use crate::runner::{BandColumns, BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the trade tape as CSV.
///
/// Columns: index, date, order, close
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["index", "date", "order", "close"])?;
    for t in trades {
        wtr.write_record([
            &t.index.to_string(),
            &t.date.to_string(),
            &t.order.to_string(),
            &format!("{:.2}", t.close),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the per-tick timeline as CSV, with band columns when present.
///
/// Columns: index, date, close, position, gross, cost, net
/// [, middle, upper, lower]. Immature band values are left empty.
pub fn export_timeline_csv(
    timeline: &[TimelinePoint],
    bands: Option<&BandColumns>,
) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec!["index", "date", "close", "position", "gross", "cost", "net"];
    if bands.is_some() {
        header.extend(["middle", "upper", "lower"]);
    }
    wtr.write_record(&header)?;

    let band_cell = |column: &[Option<f64>], i: usize| {
        column
            .get(i)
            .copied()
            .flatten()
            .map(|v| format!("{v:.4}"))
            .unwrap_or_default()
    };

    for (i, p) in timeline.iter().enumerate() {
        let mut row = vec![
            p.index.to_string(),
            p.date.to_string(),
            format!("{:.2}", p.close),
            p.position.to_string(),
            format!("{:.2}", p.gross),
            format!("{:.2}", p.cost),
            format!("{:.2}", p.net),
        ];
        if let Some(b) = bands {
            row.push(band_cell(&b.middle, i));
            row.push(band_cell(&b.upper, i));
            row.push(band_cell(&b.lower, i));
        }
        wtr.write_record(&row)?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for a single backtest run.
pub fn generate_report(result: &BacktestResult) -> String {
    let s = &result.summary;
    let mut md = String::with_capacity(1024);

    md.push_str("# Backtest Report\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    let _ = writeln!(md, "| Run | {} |", result.run_id);
    let _ = writeln!(md, "| Symbol | {} |", result.symbol);
    let _ = writeln!(
        md,
        "| Period | {} to {} ({} points) |",
        result.first_date, result.last_date, result.points
    );
    let _ = writeln!(md, "| Strategy | {} |", result.strategy);
    let _ = writeln!(md, "| Cost Model | {} |", result.cost_model);
    md.push('\n');

    md.push_str("## Performance\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    let _ = writeln!(md, "| Trades | {} |", s.trades);
    let _ = writeln!(md, "| Final Position | {} |", s.position);
    let _ = writeln!(md, "| Gross PnL | {:.2} |", s.gross);
    let _ = writeln!(md, "| Trading Cost | {:.2} |", s.cost);
    let _ = writeln!(md, "| Net PnL | {:.2} |", s.net);
    let _ = writeln!(md, "| Passive PnL | {:.2} |", s.passive);
    let _ = writeln!(md, "| Net vs Passive | {:+.2} |", s.net - s.passive);

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates `{output_dir}/{run_id}/` containing:
/// - `result.json`: the full `BacktestResult`
/// - `trades.csv`: trade tape
/// - `timeline.csv`: per-tick position and PnL
/// - `report.md`: human-readable summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(&result.run_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let write = |name: &str, contents: &str| -> Result<()> {
        let path = run_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))
    };
    write("result.json", &export_json(result)?)?;
    write("trades.csv", &export_trades_csv(&result.trades)?)?;
    write(
        "timeline.csv",
        &export_timeline_csv(&result.timeline, result.bands.as_ref())?,
    )?;
    write("report.md", &generate_report(result))?;

    info!(run_id = %result.run_id, dir = %run_dir.display(), "saved artifacts");
    Ok(run_dir)
}

/// Load a `BacktestResult` from an artifact directory's result.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ticklab_core::{OrderSide, Position};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 5, d).unwrap()
    }

    #[test]
    fn trades_csv_layout() {
        let trades = vec![
            TradeRecord {
                index: 0,
                date: day(25),
                order: OrderSide::Buy,
                close: 100.34,
            },
            TradeRecord {
                index: 3,
                date: day(28),
                order: OrderSide::Sell,
                close: 101.51,
            },
        ];
        let csv = export_trades_csv(&trades).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "index,date,order,close");
        assert_eq!(lines[1], "0,2012-05-25,buy,100.34");
        assert_eq!(lines[2], "3,2012-05-28,sell,101.51");
    }

    #[test]
    fn timeline_csv_with_bands_leaves_immature_cells_empty() {
        let timeline = vec![
            TimelinePoint {
                index: 0,
                date: day(25),
                close: 4.0,
                position: Position::Flat,
                gross: 0.0,
                cost: 0.0,
                net: 0.0,
            },
            TimelinePoint {
                index: 1,
                date: day(26),
                close: 8.0,
                position: Position::Long,
                gross: -8.0,
                cost: 0.04,
                net: -0.04,
            },
        ];
        let bands = BandColumns {
            period: 2,
            width: 1.0,
            middle: vec![None, Some(6.0)],
            upper: vec![None, Some(8.0)],
            lower: vec![None, Some(4.0)],
        };
        let csv = export_timeline_csv(&timeline, Some(&bands)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "index,date,close,position,gross,cost,net,middle,upper,lower");
        assert_eq!(lines[1], "0,2012-05-25,4.00,flat,0.00,0.00,0.00,,,");
        assert_eq!(
            lines[2],
            "1,2012-05-26,8.00,long,-8.00,0.04,-0.04,6.0000,8.0000,4.0000"
        );

        let plain = export_timeline_csv(&timeline, None).unwrap();
        assert_eq!(
            plain.lines().next().unwrap(),
            "index,date,close,position,gross,cost,net"
        );
    }
}
