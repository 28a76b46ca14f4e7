//! PerformanceRecord — one month of simulated DCA performance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The state of a DCA position after one month's purchase, marked to market
/// at that month's effective price.
///
/// `roi` is percentage-scaled (`5.0` means 5%), as are all percent values in
/// this workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub date: NaiveDate,
    /// Effective price used for this month's purchase.
    pub price: f64,
    /// Shares bought this month.
    pub shares: f64,
    /// Running share count, this month included.
    pub total_shares: f64,
    /// This month's contribution.
    pub invested: f64,
    /// Running contributed capital, this month included.
    pub total_invested: f64,
    /// `total_shares * price`.
    pub portfolio_value: f64,
    /// `(portfolio_value - total_invested) / total_invested * 100`.
    pub roi: f64,
    /// Cash dividend attributed to this month (carried over, informational).
    pub dividend: f64,
}
