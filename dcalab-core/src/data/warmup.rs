//! Cache warm-up — pre-fetches the popular symbols with progress reporting.
//!
//! Explicitly invoked by the caller (typically `dcalab warmup` or a flag on
//! `run`); the library never fetches on its own initiative.

use super::provider::{DataError, FetchProgress, PriceHistoryProvider};

/// Fetch each symbol once so later runs hit the cache. Stops early when the
/// provider becomes unavailable and marks the remaining symbols as failed.
pub fn warm_up(
    provider: &dyn PriceHistoryProvider,
    symbols: &[&str],
    progress: &dyn FetchProgress,
) -> WarmupSummary {
    let total = symbols.len();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        let result = provider.monthly_history(symbol).map(|_| ());
        progress.on_complete(symbol, i, total, &result);

        match result {
            Ok(()) => succeeded += 1,
            Err(e) => {
                errors.push((symbol.to_string(), e));
                failed += 1;
            }
        }

        // Bail out early if the circuit breaker tripped
        if !provider.is_available() {
            for sym in &symbols[(i + 1)..total] {
                errors.push((sym.to_string(), DataError::CircuitBreakerTripped));
                failed += 1;
            }
            break;
        }
    }

    progress.on_batch_complete(succeeded, failed, total);

    WarmupSummary {
        total,
        succeeded,
        failed,
        errors,
    }
}

/// Summary of a warm-up pass.
#[derive(Debug)]
pub struct WarmupSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(String, DataError)>,
}

impl WarmupSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
