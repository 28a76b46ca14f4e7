//! DCA Lab Runner — batch orchestration, aggregate statistics, ranking, exports.
//!
//! This crate builds on `dcalab-core` to provide:
//! - Batch configuration (TOML) with per-plan overrides
//! - Parallel fan-out of plans with per-symbol failure reporting
//! - CAGR, volatility, and ranking metrics
//! - Portfolio aggregation and the combined series
//! - CSV export keyed by content-addressed run IDs
//! - Display formatting for summary tables

pub mod config;
pub mod export;
pub mod format;
pub mod metrics;
pub mod runner;
pub mod summary;

pub use config::{BatchConfig, ConfigError, PlanConfig, RunId};
pub use export::{export_batch, ExportError};
pub use format::{format_currency, format_percent, format_shares};
pub use metrics::{cagr, monthly_returns, volatility, years_between};
pub use runner::{run_batch, run_symbol, BatchOutcome, RunError, SymbolRun};
pub use summary::{
    aggregate, combined_series, rank_by_roi, summarize, CombinedPoint, PortfolioSummary,
    SymbolSummary,
};
