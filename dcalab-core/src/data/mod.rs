//! Data acquisition and caching

pub mod cache;
pub mod circuit_breaker;
pub mod csv_import;
pub mod fmp;
pub mod provider;
pub mod synthetic;
pub mod warmup;

pub use cache::{CachePolicy, CacheStatus, CachedHistoryProvider, TtlCache};
pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvHistoryProvider;
pub use fmp::{FmpProvider, POPULAR_SYMBOLS};
pub use provider::{
    DataError, FetchProgress, PriceHistoryProvider, QuoteSnapshot, SilentProgress, StdoutProgress,
    SymbolDirectory, SymbolMatch,
};
pub use synthetic::SyntheticProvider;
pub use warmup::{warm_up, WarmupSummary};
