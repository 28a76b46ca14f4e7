//! Property tests for aggregation and ranking invariants.
//!
//! Uses proptest to verify:
//! 1. Ranking — descending ROI, and a permutation of the input
//! 2. Aggregation — totals are the sums, ROI is consistent with them,
//!    and the result does not depend on input order
//! 3. Combined series — chronological and conserves cash totals
//! 4. Volatility — non-negative, zero for flat series

use chrono::NaiveDate;
use proptest::prelude::*;

use dcalab_core::domain::PerformanceRecord;
use dcalab_runner::{
    aggregate, combined_series, rank_by_roi, volatility, SymbolSummary,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_summary(tag: usize) -> impl Strategy<Value = SymbolSummary> {
    ((100.0..100_000.0_f64), (-90.0..300.0_f64)).prop_map(move |(invested, roi)| {
        let invested = (invested * 100.0).round() / 100.0;
        let roi = (roi * 100.0).round() / 100.0;
        SymbolSummary {
            symbol: format!("SYM{tag}"),
            display_name: format!("Symbol {tag}"),
            total_invested: invested,
            portfolio_value: invested * (1.0 + roi / 100.0),
            roi,
            total_shares: 1.0,
            current_price: 100.0,
            cagr: 0.0,
            volatility: 0.0,
            years: 1.0,
            months: 12,
        }
    })
}

fn arb_summaries() -> impl Strategy<Value = Vec<SymbolSummary>> {
    (1..10_usize).prop_flat_map(|n| (0..n).map(arb_summary).collect::<Vec<_>>())
}

fn arb_record_series() -> impl Strategy<Value = Vec<PerformanceRecord>> {
    prop::collection::vec((50.0..200.0_f64), 1..36).prop_map(|prices| {
        let base = NaiveDate::from_ymd_opt(2015, 1, 5).unwrap();
        let mut total_shares = 0.0;
        prices
            .into_iter()
            .enumerate()
            .map(|(i, price)| {
                total_shares += 100.0 / price;
                let total_invested = 100.0 * (i + 1) as f64;
                let portfolio_value = total_shares * price;
                PerformanceRecord {
                    date: base + chrono::Months::new(i as u32),
                    price,
                    shares: 100.0 / price,
                    total_shares,
                    invested: 100.0,
                    total_invested,
                    portfolio_value,
                    roi: (portfolio_value - total_invested) / total_invested * 100.0,
                    dividend: 0.0,
                }
            })
            .collect()
    })
}

// ── 1. Ranking ───────────────────────────────────────────────────────

proptest! {
    /// Ranked output is descending by ROI and contains exactly the input
    /// symbols.
    #[test]
    fn ranking_is_descending_and_a_permutation(mut summaries in arb_summaries()) {
        let mut before: Vec<String> = summaries.iter().map(|s| s.symbol.clone()).collect();
        rank_by_roi(&mut summaries);

        for w in summaries.windows(2) {
            prop_assert!(w[0].roi >= w[1].roi);
        }

        let mut after: Vec<String> = summaries.iter().map(|s| s.symbol.clone()).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }
}

// ── 2. Aggregation ───────────────────────────────────────────────────

proptest! {
    /// Portfolio totals are the plain sums, and the blended ROI reproduces
    /// them exactly.
    #[test]
    fn aggregate_totals_are_sums(summaries in arb_summaries()) {
        let portfolio = aggregate(&summaries);

        let invested: f64 = summaries.iter().map(|s| s.total_invested).sum();
        let value: f64 = summaries.iter().map(|s| s.portfolio_value).sum();
        prop_assert_eq!(portfolio.total_invested.to_bits(), invested.to_bits());
        prop_assert_eq!(portfolio.portfolio_value.to_bits(), value.to_bits());

        let expected_roi = (value - invested) / invested * 100.0;
        prop_assert_eq!(portfolio.roi.to_bits(), expected_roi.to_bits());
        prop_assert_eq!(portfolio.symbol_count, summaries.len());
    }

    /// Aggregation is order-independent: ranking first changes nothing about
    /// the portfolio totals.
    #[test]
    fn aggregate_ignores_input_order(mut summaries in arb_summaries()) {
        let unranked = aggregate(&summaries);
        rank_by_roi(&mut summaries);
        let ranked = aggregate(&summaries);

        prop_assert!((unranked.total_invested - ranked.total_invested).abs() < 1e-6);
        prop_assert!((unranked.portfolio_value - ranked.portfolio_value).abs() < 1e-6);
        prop_assert!((unranked.roi - ranked.roi).abs() < 1e-9);
    }
}

// ── 3. Combined series ───────────────────────────────────────────────

proptest! {
    /// The combined series is strictly chronological and its final point
    /// carries the sum of every symbol's final totals (all series here share
    /// the same dates).
    #[test]
    fn combined_series_is_chronological_and_conserves_totals(
        a in arb_record_series(),
        b in arb_record_series(),
    ) {
        let len = a.len().min(b.len());
        let a: Vec<_> = a.into_iter().take(len).collect();
        let b: Vec<_> = b.into_iter().take(len).collect();

        let combined = combined_series(&[a.clone(), b.clone()]);
        for w in combined.windows(2) {
            prop_assert!(w[0].date < w[1].date);
        }

        let last = combined.last().unwrap();
        let expected_invested =
            a.last().unwrap().total_invested + b.last().unwrap().total_invested;
        let expected_value =
            a.last().unwrap().portfolio_value + b.last().unwrap().portfolio_value;
        prop_assert!((last.total_invested - expected_invested).abs() < 1e-6);
        prop_assert!((last.portfolio_value - expected_value).abs() < 1e-6);
    }
}

// ── 4. Volatility ────────────────────────────────────────────────────

proptest! {
    /// Volatility of positive value series is never negative, and a flat
    /// series has exactly zero.
    #[test]
    fn volatility_is_non_negative(values in prop::collection::vec(1.0..10_000.0_f64, 0..60)) {
        prop_assert!(volatility(&values) >= 0.0);
    }

    #[test]
    fn flat_series_has_zero_volatility(value in 1.0..10_000.0_f64, n in 2..30_usize) {
        let values = vec![value; n];
        prop_assert_eq!(volatility(&values), 0.0);
    }
}
