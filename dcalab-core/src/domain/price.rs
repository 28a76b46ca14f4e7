//! PricePoint — the fundamental market data unit.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Closing price for a single symbol for a single calendar month.
///
/// `date` is the first-seen trading day of that month in the source series.
/// `adjusted_price` is the dividend/split-adjusted close when the provider
/// supplies one; share-count math prefers it over the raw close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub adjusted_price: Option<f64>,
    #[serde(default)]
    pub dividend: f64,
}

impl PricePoint {
    /// The price used for share-count math: the adjusted close when present
    /// and non-zero, otherwise the raw close.
    pub fn effective_price(&self) -> f64 {
        match self.adjusted_price {
            Some(adj) if adj != 0.0 => adj,
            _ => self.price,
        }
    }

    /// Basic sanity check: a positive, finite effective price.
    pub fn is_sane(&self) -> bool {
        let p = self.effective_price();
        p.is_finite() && p > 0.0
    }
}

/// Returns true if the series is chronologically ordered with at most one
/// point per calendar month. Gaps are fine; duplicates and disorder are not.
pub fn is_monthly_series(series: &[PricePoint]) -> bool {
    series.windows(2).all(|w| {
        w[0].date < w[1].date
            && (w[0].date.year(), w[0].date.month()) != (w[1].date.year(), w[1].date.month())
    })
}
