//! Aggregate metrics — pure functions over performance series.
//!
//! Every metric is a pure function: series in, scalar out. All rates are
//! percentage-scaled (5.0 means five percent), matching the ROI field on
//! `PerformanceRecord`. Degenerate inputs return 0.0 rather than NaN so
//! summary tables stay printable.

use chrono::NaiveDate;

/// Elapsed years between two dates, on a fixed 365-day year.
///
/// Leap days are deliberately not special-cased; the drift is far below the
/// resolution of a monthly plan.
pub fn years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / 365.0
}

/// Compound Annual Growth Rate, as a percentage.
///
/// Returns 0.0 when the period is empty or the starting value is zero.
pub fn cagr(start_value: f64, end_value: f64, years: f64) -> f64 {
    if years == 0.0 || start_value == 0.0 {
        return 0.0;
    }
    ((end_value / start_value).powf(1.0 / years) - 1.0) * 100.0
}

/// Month-over-month percentage returns of a value series.
///
/// Pairs whose previous value is zero or negative are skipped, so the output
/// can be shorter than `len - 1`.
pub fn monthly_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .collect()
}

/// Sample standard deviation of monthly returns, as a percentage.
///
/// Uses the unbiased (n-1) estimator. Returns 0.0 with fewer than two
/// usable returns.
pub fn volatility(values: &[f64]) -> f64 {
    let returns = monthly_returns(values);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns
        .iter()
        .map(|r| (r - mean) * (r - mean))
        .sum::<f64>()
        / (returns.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── years_between ───────────────────────────────────────────────

    #[test]
    fn years_between_one_calendar_year() {
        // 2021 is not a leap year: exactly 365 days.
        let years = years_between(date(2021, 1, 1), date(2022, 1, 1));
        assert!((years - 1.0).abs() < 1e-12);
    }

    #[test]
    fn years_between_uses_fixed_365_day_year() {
        // 2020 is a leap year: 366 days / 365.
        let years = years_between(date(2020, 1, 1), date(2021, 1, 1));
        assert!((years - 366.0 / 365.0).abs() < 1e-12);
    }

    #[test]
    fn years_between_same_date_is_zero() {
        assert_eq!(years_between(date(2020, 6, 1), date(2020, 6, 1)), 0.0);
    }

    // ── cagr ────────────────────────────────────────────────────────

    #[test]
    fn cagr_doubling_in_one_year_is_100_percent() {
        assert!((cagr(100.0, 200.0, 1.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn cagr_doubling_in_ten_years() {
        // 2^(1/10) - 1 = 7.177...%
        let c = cagr(100.0, 200.0, 10.0);
        assert!((c - 7.177346253629313).abs() < 1e-9);
    }

    #[test]
    fn cagr_decline_is_negative() {
        assert!(cagr(200.0, 100.0, 1.0) < 0.0);
    }

    #[test]
    fn cagr_zero_years_guard() {
        assert_eq!(cagr(100.0, 200.0, 0.0), 0.0);
    }

    #[test]
    fn cagr_zero_start_guard() {
        assert_eq!(cagr(0.0, 200.0, 5.0), 0.0);
    }

    #[test]
    fn cagr_flat_is_zero() {
        assert!(cagr(150.0, 150.0, 3.0).abs() < 1e-12);
    }

    // ── monthly_returns ─────────────────────────────────────────────

    #[test]
    fn monthly_returns_basic() {
        let returns = monthly_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 10.0).abs() < 1e-9);
        assert!((returns[1] - (-10.0)).abs() < 1e-9);
    }

    #[test]
    fn monthly_returns_skips_non_positive_bases() {
        let returns = monthly_returns(&[0.0, 100.0, 110.0]);
        assert_eq!(returns.len(), 1);
        assert!((returns[0] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn monthly_returns_short_series() {
        assert!(monthly_returns(&[]).is_empty());
        assert!(monthly_returns(&[100.0]).is_empty());
    }

    // ── volatility ──────────────────────────────────────────────────

    #[test]
    fn volatility_of_symmetric_swing() {
        // Returns are [+10, -10]; sample stddev = sqrt(200) = 14.142...
        let v = volatility(&[100.0, 110.0, 99.0]);
        assert!((v - 14.142135623730951).abs() < 1e-9);
    }

    #[test]
    fn volatility_of_constant_series_is_zero() {
        assert_eq!(volatility(&[100.0, 100.0, 100.0, 100.0]), 0.0);
    }

    #[test]
    fn volatility_needs_two_returns() {
        assert_eq!(volatility(&[100.0, 110.0]), 0.0);
        assert_eq!(volatility(&[100.0]), 0.0);
    }

    #[test]
    fn volatility_is_scale_invariant() {
        let small = volatility(&[100.0, 103.0, 101.0, 106.0]);
        let large = volatility(&[100_000.0, 103_000.0, 101_000.0, 106_000.0]);
        assert!((small - large).abs() < 1e-9);
    }
}
