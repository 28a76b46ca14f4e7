//! Batch runner — wires together providers, the simulator, and summaries.
//!
//! Two entry points:
//! - `run_symbol()`: fetch one symbol's history and simulate it.
//! - `run_batch()`: fan the plans out across threads, fan results back in.
//!
//! Failures stay per-symbol: one bad symbol never aborts the batch, and a
//! failed symbol is reported, never averaged in as zeros.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dcalab_core::data::{DataError, PriceHistoryProvider};
use dcalab_core::domain::PerformanceRecord;
use dcalab_core::SimulationConfig;

use crate::config::{BatchConfig, ConfigError, PlanConfig};
use crate::summary::{summarize, SymbolSummary};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("no data for '{symbol}' on or after the start date")]
    EmptySimulation { symbol: String },
}

/// Result of one symbol's simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolRun {
    pub symbol: String,
    pub display_name: String,
    pub records: Vec<PerformanceRecord>,
    pub summary: SymbolSummary,
}

/// Fan-in result of a whole batch: completed runs plus per-symbol failures.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Completed runs, in plan order.
    pub runs: Vec<SymbolRun>,
    /// Symbols that failed, with the reason.
    pub failures: Vec<(String, RunError)>,
}

impl BatchOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch one symbol's history and run its plan.
pub fn run_symbol(
    provider: &dyn PriceHistoryProvider,
    config: &BatchConfig,
    plan: &PlanConfig,
) -> Result<SymbolRun, RunError> {
    let series = provider.monthly_history(&plan.symbol)?;

    let display_name = plan.display_name.clone().unwrap_or_else(|| plan.symbol.clone());
    let sim = SimulationConfig {
        symbol: plan.symbol.clone(),
        display_name: display_name.clone(),
        monthly_investment: config.monthly_for(plan),
        start_date: config.start_for(plan),
    };
    let records = sim.run(&series);

    let summary =
        summarize(&plan.symbol, &display_name, &records).ok_or(RunError::EmptySimulation {
            symbol: plan.symbol.clone(),
        })?;

    Ok(SymbolRun {
        symbol: sim.symbol,
        display_name,
        records,
        summary,
    })
}

/// Run every plan in the batch, one rayon task per symbol.
///
/// Each task is fetch + simulate; the fold inside a symbol stays serial.
/// Results come back in plan order regardless of completion order.
pub fn run_batch(provider: &dyn PriceHistoryProvider, config: &BatchConfig) -> BatchOutcome {
    let results: Vec<(String, Result<SymbolRun, RunError>)> = config
        .plans
        .par_iter()
        .map(|plan| (plan.symbol.clone(), run_symbol(provider, config, plan)))
        .collect();

    let mut runs = Vec::new();
    let mut failures = Vec::new();
    for (symbol, result) in results {
        match result {
            Ok(run) => runs.push(run),
            Err(e) => failures.push((symbol, e)),
        }
    }

    BatchOutcome { runs, failures }
}
