//! Per-symbol summaries, portfolio aggregation, ranking, and the combined
//! portfolio series.
//!
//! A symbol's summary is read off the final record of its performance series;
//! CAGR and volatility come from the metrics module. Portfolio-level ROI and
//! CAGR are computed from the summed cash amounts, never by averaging
//! per-symbol rates — averaging percentages would weight a $10 plan equal to
//! a $10,000 one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use dcalab_core::domain::PerformanceRecord;

use crate::metrics::{cagr, volatility, years_between};

/// Aggregate statistics for one symbol's simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolSummary {
    pub symbol: String,
    pub display_name: String,
    pub total_invested: f64,
    pub portfolio_value: f64,
    /// Final ROI, percentage-scaled.
    pub roi: f64,
    pub total_shares: f64,
    pub current_price: f64,
    /// Percentage-scaled.
    pub cagr: f64,
    /// Sample stddev of monthly value returns, percentage-scaled.
    pub volatility: f64,
    pub years: f64,
    pub months: usize,
}

/// Summarize one symbol's performance series. Empty series have no summary.
pub fn summarize(
    symbol: &str,
    display_name: &str,
    records: &[PerformanceRecord],
) -> Option<SymbolSummary> {
    let first = records.first()?;
    let last = records.last()?;

    let years = years_between(first.date, last.date);
    let values: Vec<f64> = records.iter().map(|r| r.portfolio_value).collect();

    Some(SymbolSummary {
        symbol: symbol.to_string(),
        display_name: display_name.to_string(),
        total_invested: last.total_invested,
        portfolio_value: last.portfolio_value,
        roi: last.roi,
        total_shares: last.total_shares,
        current_price: last.price,
        cagr: cagr(first.total_invested, last.portfolio_value, years),
        volatility: volatility(&values),
        years,
        months: records.len(),
    })
}

/// Portfolio-level aggregate over several symbol summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub symbol_count: usize,
    pub total_invested: f64,
    pub portfolio_value: f64,
    /// Blended ROI from the summed amounts, percentage-scaled.
    pub roi: f64,
    /// Mean plan length across symbols, in years.
    pub avg_years: f64,
    /// Portfolio CAGR from the summed amounts over `avg_years`.
    pub cagr: f64,
}

/// Aggregate symbol summaries into a portfolio view.
pub fn aggregate(summaries: &[SymbolSummary]) -> PortfolioSummary {
    let total_invested: f64 = summaries.iter().map(|s| s.total_invested).sum();
    let portfolio_value: f64 = summaries.iter().map(|s| s.portfolio_value).sum();

    let roi = if total_invested == 0.0 {
        0.0
    } else {
        (portfolio_value - total_invested) / total_invested * 100.0
    };

    let avg_years = if summaries.is_empty() {
        0.0
    } else {
        summaries.iter().map(|s| s.years).sum::<f64>() / summaries.len() as f64
    };

    PortfolioSummary {
        symbol_count: summaries.len(),
        total_invested,
        portfolio_value,
        roi,
        avg_years,
        cagr: cagr(total_invested, portfolio_value, avg_years),
    }
}

/// Rank summaries by final ROI, best first. The sort is stable: symbols with
/// equal ROI keep their input order.
pub fn rank_by_roi(summaries: &mut [SymbolSummary]) {
    summaries.sort_by(|a, b| b.roi.partial_cmp(&a.roi).unwrap_or(std::cmp::Ordering::Equal));
}

/// One point of the combined portfolio series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedPoint {
    pub date: NaiveDate,
    pub total_invested: f64,
    pub portfolio_value: f64,
    /// Percentage-scaled, 0.0 when nothing is invested yet.
    pub roi: f64,
}

/// Sum per-symbol series into one portfolio series over the union of dates.
///
/// At each date, every symbol contributes the record it has on exactly that
/// date; symbols without one contribute nothing that month. Monthly series
/// from the same provider share dates, so in practice this only matters when
/// plans start at different times.
pub fn combined_series(series: &[Vec<PerformanceRecord>]) -> Vec<CombinedPoint> {
    let mut by_date: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();

    for records in series {
        for rec in records {
            let entry = by_date.entry(rec.date).or_insert((0.0, 0.0));
            entry.0 += rec.total_invested;
            entry.1 += rec.portfolio_value;
        }
    }

    by_date
        .into_iter()
        .map(|(date, (total_invested, portfolio_value))| CombinedPoint {
            date,
            total_invested,
            portfolio_value,
            roi: if total_invested == 0.0 {
                0.0
            } else {
                (portfolio_value - total_invested) / total_invested * 100.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        d: NaiveDate,
        price: f64,
        total_shares: f64,
        total_invested: f64,
    ) -> PerformanceRecord {
        let portfolio_value = total_shares * price;
        PerformanceRecord {
            date: d,
            price,
            shares: 0.0,
            total_shares,
            invested: 100.0,
            total_invested,
            portfolio_value,
            roi: (portfolio_value - total_invested) / total_invested * 100.0,
            dividend: 0.0,
        }
    }

    fn three_month_series() -> Vec<PerformanceRecord> {
        vec![
            record(date(2020, 1, 2), 100.0, 1.0, 100.0),
            record(date(2020, 2, 3), 110.0, 1.9090909090909092, 200.0),
            record(date(2020, 3, 2), 90.0, 3.0202020202020203, 300.0),
        ]
    }

    // ── summarize ───────────────────────────────────────────────────

    #[test]
    fn summary_reads_the_final_record() {
        let s = summarize("DEMO", "Demo Corp", &three_month_series()).unwrap();
        assert_eq!(s.total_invested, 300.0);
        assert!((s.portfolio_value - 271.8181818181818).abs() < 1e-9);
        assert!((s.roi - (-9.393939393939394)).abs() < 1e-9);
        assert_eq!(s.current_price, 90.0);
        assert_eq!(s.months, 3);
    }

    #[test]
    fn summary_of_empty_series_is_none() {
        assert!(summarize("DEMO", "Demo", &[]).is_none());
    }

    #[test]
    fn summary_cagr_runs_first_invested_to_last_value() {
        let records = vec![
            record(date(2020, 1, 2), 100.0, 1.0, 100.0),
            record(date(2021, 1, 2), 100.0, 2.0, 200.0),
        ];
        let s = summarize("DEMO", "Demo", &records).unwrap();
        // 100 invested grows to a 200 position over ~1 year.
        assert!((s.years - 366.0 / 365.0).abs() < 1e-9);
        assert!(s.cagr > 90.0);
    }

    #[test]
    fn single_record_summary_has_zero_rates() {
        let records = vec![record(date(2020, 1, 2), 100.0, 1.0, 100.0)];
        let s = summarize("DEMO", "Demo", &records).unwrap();
        assert_eq!(s.years, 0.0);
        assert_eq!(s.cagr, 0.0);
        assert_eq!(s.volatility, 0.0);
    }

    // ── aggregate ───────────────────────────────────────────────────

    #[test]
    fn blended_roi_comes_from_sums_not_rate_averages() {
        let a = summarize("A", "A", &three_month_series()).unwrap();
        // Second symbol: 300 invested, final value 330 (+10%).
        let b_records = vec![
            record(date(2020, 1, 2), 100.0, 1.0, 100.0),
            record(date(2020, 2, 3), 100.0, 2.0, 200.0),
            record(date(2020, 3, 2), 110.0, 3.0, 300.0),
        ];
        let b = summarize("B", "B", &b_records).unwrap();

        let portfolio = aggregate(&[a, b]);
        assert_eq!(portfolio.total_invested, 600.0);
        assert!((portfolio.portfolio_value - 601.8181818181818).abs() < 1e-9);
        // (601.82 - 600) / 600 * 100 = 0.303%; the rate average would be 0.3%.
        assert!((portfolio.roi - 0.30303030303030304).abs() < 1e-9);
    }

    #[test]
    fn aggregate_of_nothing_is_all_zeros() {
        let portfolio = aggregate(&[]);
        assert_eq!(portfolio.symbol_count, 0);
        assert_eq!(portfolio.total_invested, 0.0);
        assert_eq!(portfolio.roi, 0.0);
        assert_eq!(portfolio.cagr, 0.0);
    }

    // ── rank_by_roi ─────────────────────────────────────────────────

    #[test]
    fn ranking_is_descending_by_roi() {
        let mut summaries = vec![
            summary_with_roi("LOW", -5.0),
            summary_with_roi("HIGH", 25.0),
            summary_with_roi("MID", 10.0),
        ];
        rank_by_roi(&mut summaries);
        let order: Vec<&str> = summaries.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(order, vec!["HIGH", "MID", "LOW"]);
    }

    #[test]
    fn ranking_ties_keep_input_order() {
        let mut summaries = vec![
            summary_with_roi("FIRST", 10.0),
            summary_with_roi("SECOND", 10.0),
            summary_with_roi("THIRD", 10.0),
        ];
        rank_by_roi(&mut summaries);
        let order: Vec<&str> = summaries.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(order, vec!["FIRST", "SECOND", "THIRD"]);
    }

    fn summary_with_roi(symbol: &str, roi: f64) -> SymbolSummary {
        SymbolSummary {
            symbol: symbol.to_string(),
            display_name: symbol.to_string(),
            total_invested: 100.0,
            portfolio_value: 100.0 * (1.0 + roi / 100.0),
            roi,
            total_shares: 1.0,
            current_price: 100.0,
            cagr: 0.0,
            volatility: 0.0,
            years: 1.0,
            months: 12,
        }
    }

    // ── combined_series ─────────────────────────────────────────────

    #[test]
    fn combined_series_sums_matching_dates() {
        let a = three_month_series();
        let b = vec![
            record(date(2020, 1, 2), 50.0, 2.0, 100.0),
            record(date(2020, 2, 3), 50.0, 4.0, 200.0),
            record(date(2020, 3, 2), 55.0, 6.0, 300.0),
        ];
        let combined = combined_series(&[a, b]);
        assert_eq!(combined.len(), 3);
        assert_eq!(combined[0].total_invested, 200.0);
        assert!((combined[0].portfolio_value - 200.0).abs() < 1e-9);
        assert_eq!(combined[2].total_invested, 600.0);
    }

    #[test]
    fn combined_series_covers_the_union_of_dates() {
        // Second plan starts a month later.
        let a = three_month_series();
        let b = vec![
            record(date(2020, 2, 3), 50.0, 2.0, 100.0),
            record(date(2020, 3, 2), 55.0, 4.0, 200.0),
        ];
        let combined = combined_series(&[a, b]);
        assert_eq!(combined.len(), 3);
        // January only has the first plan.
        assert_eq!(combined[0].total_invested, 100.0);
        // February has both.
        assert_eq!(combined[1].total_invested, 300.0);
    }

    #[test]
    fn combined_series_is_chronological() {
        let combined = combined_series(&[three_month_series()]);
        for w in combined.windows(2) {
            assert!(w[0].date < w[1].date);
        }
    }

    #[test]
    fn combined_series_of_nothing_is_empty() {
        assert!(combined_series(&[]).is_empty());
    }
}
