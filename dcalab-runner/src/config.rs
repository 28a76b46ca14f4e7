//! Serializable batch configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a batch run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One plan inside a batch: a symbol plus optional per-symbol overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanConfig {
    pub symbol: String,

    /// Display name shown in summaries; defaults to the symbol.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Overrides the batch-level monthly amount for this symbol.
    #[serde(default)]
    pub monthly_investment: Option<f64>,

    /// Overrides the batch-level start date for this symbol.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// Serializable configuration for a batch of simulations.
///
/// This struct captures everything needed to reproduce a batch:
/// the plans, the shared monthly amount and start date, and the
/// data-source selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// Contribution per month, in currency units, unless overridden per plan.
    pub monthly_investment: f64,

    /// First month included in every plan, unless overridden per plan.
    pub start_date: NaiveDate,

    /// The plans to simulate.
    pub plans: Vec<PlanConfig>,
}

impl BatchConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulator would silently mangle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plans.is_empty() {
            return Err(ConfigError::Invalid("no plans configured".into()));
        }
        for plan in &self.plans {
            if plan.symbol.trim().is_empty() {
                return Err(ConfigError::Invalid("empty symbol in plan".into()));
            }
            let monthly = plan.monthly_investment.unwrap_or(self.monthly_investment);
            if !monthly.is_finite() || monthly <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "monthly investment for {} must be positive, got {monthly}",
                    plan.symbol
                )));
            }
        }
        Ok(())
    }

    /// Effective monthly amount for a plan.
    pub fn monthly_for(&self, plan: &PlanConfig) -> f64 {
        plan.monthly_investment.unwrap_or(self.monthly_investment)
    }

    /// Effective start date for a plan.
    pub fn start_for(&self, plan: &PlanConfig) -> NaiveDate {
        plan.start_date.unwrap_or(self.start_date)
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two batches with identical configs share the same RunId, so exported
    /// artifacts land in the same directory and overwrite cleanly.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("BatchConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }
}
