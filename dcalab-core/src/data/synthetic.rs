//! Deterministic synthetic price series for demos and tests.
//!
//! Generates a monthly geometric random walk seeded from the symbol name, so
//! the same symbol always yields the same series without any network or disk
//! access.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, PriceHistoryProvider};
use crate::domain::PricePoint;

/// Synthetic random-walk provider.
pub struct SyntheticProvider {
    start: NaiveDate,
    months: u32,
    initial_price: f64,
    monthly_drift: f64,
    monthly_sigma: f64,
}

impl SyntheticProvider {
    /// Twenty years of monthly data from 2005, mild upward drift.
    pub fn new() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2005, 1, 3).unwrap(),
            months: 240,
            initial_price: 100.0,
            monthly_drift: 0.006,
            monthly_sigma: 0.045,
        }
    }

    pub fn with_range(mut self, start: NaiveDate, months: u32) -> Self {
        self.start = start;
        self.months = months;
        self
    }

    fn seed_for(symbol: &str) -> u64 {
        let hash = blake3::hash(symbol.as_bytes());
        u64::from_le_bytes(hash.as_bytes()[..8].try_into().unwrap())
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceHistoryProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn monthly_history(&self, symbol: &str) -> Result<Vec<PricePoint>, DataError> {
        let mut rng = StdRng::seed_from_u64(Self::seed_for(symbol));
        let mut price = self.initial_price;
        let mut points = Vec::with_capacity(self.months as usize);

        let mut year = self.start.year();
        let mut month = self.start.month();

        for _ in 0..self.months {
            // First weekday-ish of the month, jittered like a trading calendar.
            let day = 1 + rng.gen_range(0..3);
            let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                DataError::Other(format!("invalid synthetic date {year}-{month}-{day}"))
            })?;

            points.push(PricePoint {
                date,
                price,
                adjusted_price: None,
                dividend: 0.0,
            });

            let shock: f64 = rng.gen_range(-1.0..1.0);
            price *= 1.0 + self.monthly_drift + self.monthly_sigma * shock;

            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }

        Ok(points)
    }
}
