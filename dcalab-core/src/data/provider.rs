//! Provider traits and structured error types.
//!
//! `PriceHistoryProvider` abstracts over market-data sources (the FMP HTTP
//! API, CSV import, synthetic series) so the runner can swap implementations
//! and tests can mock them. `SymbolDirectory` covers search/autocomplete and
//! the curated popular-symbols listing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PricePoint;

/// Structured error types for data operations.
///
/// `SymbolNotFound` and `NoHistoryInRange` are deliberately distinct: callers
/// must be able to tell "this symbol does not exist" from "it exists but has
/// no data in the requested window".
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no price history for '{symbol}' on or after {floor}")]
    NoHistoryInRange { symbol: String, floor: NaiveDate },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("data error: {0}")]
    Other(String),
}

/// A search hit from the symbol directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
}

/// Current-quote snapshot for the popular-symbols listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

/// Trait for monthly price-history sources.
///
/// Implementations return one point per calendar month, chronologically
/// ordered, beginning no later than their configured history floor. The cache
/// layer sits above this trait — providers don't know about the cache.
pub trait PriceHistoryProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the full monthly history for a symbol.
    fn monthly_history(&self, symbol: &str) -> Result<Vec<PricePoint>, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}

/// Trait for symbol search and the popular listing.
pub trait SymbolDirectory: Send + Sync {
    /// Free-text search returning one main listing per company name.
    fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, DataError>;

    /// Quote snapshots for the curated popular symbols. Best-effort: symbols
    /// whose quote fails are omitted from the listing.
    fn popular_quotes(&self) -> Result<Vec<QuoteSnapshot>, DataError>;

    /// The curated popular-symbols list itself.
    fn popular_symbols(&self) -> &[&str];
}

/// Progress callback for multi-symbol operations.
pub trait FetchProgress: Send + Sync {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<(), DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<(), DataError>,
    ) {
        match result {
            Ok(()) => println!("  OK: {symbol}"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nWarm-up complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// No-op progress reporter for library callers.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}
    fn on_complete(
        &self,
        _symbol: &str,
        _index: usize,
        _total: usize,
        _result: &Result<(), DataError>,
    ) {
    }
    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
