//! DCA simulator — the pure fold that turns a monthly price series into a
//! performance series.
//!
//! `simulate` is a pure function: identical inputs produce bit-identical
//! outputs, which caching layers above rely on. It performs no validation of
//! the caller contract (positive monthly investment, sane prices) and never
//! suppresses non-finite float results — degenerate inputs surface through
//! ordinary IEEE arithmetic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{PerformanceRecord, PricePoint};

/// Per-symbol simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub symbol: String,
    pub display_name: String,
    /// Contribution per month, in currency units. Must be finite and positive;
    /// validated at the caller boundary, not here.
    pub monthly_investment: f64,
    /// Points dated strictly before this are excluded.
    pub start_date: NaiveDate,
}

impl SimulationConfig {
    /// Run this plan over a price series.
    pub fn run(&self, series: &[PricePoint]) -> Vec<PerformanceRecord> {
        simulate(series, self.monthly_investment, self.start_date)
    }
}

/// Simulate a monthly DCA plan over a price series.
///
/// The input need not be sorted or pre-filtered: points before `start_date`
/// are dropped, the remainder is stable-sorted ascending by date, and the
/// accumulation runs strictly in that order — each record depends on every
/// record before it, so the fold is inherently serial. Independent symbols
/// are free to run in parallel with each other.
///
/// An empty result (empty input, or `start_date` past the whole series) is a
/// valid output, not an error.
pub fn simulate(
    series: &[PricePoint],
    monthly_investment: f64,
    start_date: NaiveDate,
) -> Vec<PerformanceRecord> {
    let mut filtered: Vec<&PricePoint> = series
        .iter()
        .filter(|point| point.date >= start_date)
        .collect();
    filtered.sort_by_key(|point| point.date);

    let mut total_invested = 0.0_f64;
    let mut total_shares = 0.0_f64;

    filtered
        .into_iter()
        .map(|point| {
            let price = point.effective_price();
            let shares = monthly_investment / price;

            total_invested += monthly_investment;
            total_shares += shares;
            let portfolio_value = total_shares * price;

            PerformanceRecord {
                date: point.date,
                price,
                shares,
                total_shares,
                invested: monthly_investment,
                total_invested,
                portfolio_value,
                roi: (portfolio_value - total_invested) / total_invested * 100.0,
                dividend: point.dividend,
            }
        })
        .collect()
}
