//! CSV export of batch artifacts.
//!
//! One directory per run, keyed by the config's RunId:
//!
//! ```text
//! {export_dir}/{run_id}/
//!   records.csv    one row per symbol-month
//!   summary.csv    one row per symbol, ranked by ROI
//!   combined.csv   the summed portfolio series
//! ```
//!
//! Re-running an identical config overwrites the same directory, so exports
//! are idempotent.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use chrono::NaiveDate;

use crate::config::BatchConfig;
use crate::runner::SymbolRun;
use crate::summary::{combined_series, rank_by_roi, CombinedPoint, SymbolSummary};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Flattened per-month row for records.csv.
#[derive(Debug, Serialize)]
struct RecordRow<'a> {
    symbol: &'a str,
    date: NaiveDate,
    price: f64,
    shares: f64,
    total_shares: f64,
    invested: f64,
    total_invested: f64,
    portfolio_value: f64,
    roi: f64,
    dividend: f64,
}

/// Write all artifacts for a batch run. Returns the run directory.
pub fn export_batch(
    export_dir: impl AsRef<Path>,
    config: &BatchConfig,
    runs: &[SymbolRun],
) -> Result<PathBuf, ExportError> {
    let run_dir = export_dir.as_ref().join(config.run_id());
    fs::create_dir_all(&run_dir)?;

    write_records(&run_dir.join("records.csv"), runs)?;

    let mut summaries: Vec<SymbolSummary> = runs.iter().map(|r| r.summary.clone()).collect();
    rank_by_roi(&mut summaries);
    write_summaries(&run_dir.join("summary.csv"), &summaries)?;

    let series: Vec<_> = runs.iter().map(|r| r.records.clone()).collect();
    write_combined(&run_dir.join("combined.csv"), &combined_series(&series))?;

    Ok(run_dir)
}

fn write_records(path: &Path, runs: &[SymbolRun]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for run in runs {
        for rec in &run.records {
            writer.serialize(RecordRow {
                symbol: &run.symbol,
                date: rec.date,
                price: rec.price,
                shares: rec.shares,
                total_shares: rec.total_shares,
                invested: rec.invested,
                total_invested: rec.total_invested,
                portfolio_value: rec.portfolio_value,
                roi: rec.roi,
                dividend: rec.dividend,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_summaries(path: &Path, summaries: &[SymbolSummary]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for summary in summaries {
        writer.serialize(summary)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_combined(path: &Path, points: &[CombinedPoint]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanConfig;
    use crate::summary::summarize;
    use dcalab_core::domain::PerformanceRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_run(symbol: &str) -> SymbolRun {
        let records = vec![
            PerformanceRecord {
                date: date(2020, 1, 2),
                price: 100.0,
                shares: 1.0,
                total_shares: 1.0,
                invested: 100.0,
                total_invested: 100.0,
                portfolio_value: 100.0,
                roi: 0.0,
                dividend: 0.0,
            },
            PerformanceRecord {
                date: date(2020, 2, 3),
                price: 110.0,
                shares: 0.9090909090909091,
                total_shares: 1.9090909090909092,
                invested: 100.0,
                total_invested: 200.0,
                portfolio_value: 210.0,
                roi: 5.0,
                dividend: 0.0,
            },
        ];
        let summary = summarize(symbol, symbol, &records).unwrap();
        SymbolRun {
            symbol: symbol.to_string(),
            display_name: symbol.to_string(),
            records,
            summary,
        }
    }

    fn sample_config() -> BatchConfig {
        BatchConfig {
            monthly_investment: 100.0,
            start_date: date(2020, 1, 1),
            plans: vec![PlanConfig {
                symbol: "DEMO".into(),
                display_name: None,
                monthly_investment: None,
                start_date: None,
            }],
        }
    }

    #[test]
    fn exports_all_three_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir =
            export_batch(dir.path(), &sample_config(), &[sample_run("DEMO")]).unwrap();

        assert!(run_dir.join("records.csv").exists());
        assert!(run_dir.join("summary.csv").exists());
        assert!(run_dir.join("combined.csv").exists());
    }

    #[test]
    fn run_directory_is_keyed_by_run_id() {
        let dir = tempfile::tempdir().unwrap();
        let config = sample_config();
        let run_dir = export_batch(dir.path(), &config, &[sample_run("DEMO")]).unwrap();
        assert_eq!(
            run_dir.file_name().and_then(|n| n.to_str()),
            Some(config.run_id().as_str())
        );
    }

    #[test]
    fn records_csv_has_one_row_per_symbol_month() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = export_batch(
            dir.path(),
            &sample_config(),
            &[sample_run("A"), sample_run("B")],
        )
        .unwrap();

        let content = fs::read_to_string(run_dir.join("records.csv")).unwrap();
        // Header plus 2 symbols x 2 months.
        assert_eq!(content.lines().count(), 5);
        assert!(content.lines().next().unwrap().starts_with("symbol,date,price"));
    }

    #[test]
    fn re_export_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let config = sample_config();
        let first = export_batch(dir.path(), &config, &[sample_run("DEMO")]).unwrap();
        let second = export_batch(dir.path(), &config, &[sample_run("DEMO")]).unwrap();
        assert_eq!(first, second);
    }
}
