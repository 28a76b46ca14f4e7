//! Offline CSV price-history provider.
//!
//! Reads one file per symbol from a directory, `{dir}/{SYMBOL}.csv`, with
//! columns `date,price,adjusted_price,dividend` (the last two optional per
//! row). Useful for air-gapped runs and reproducible fixtures.

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::provider::{DataError, PriceHistoryProvider};
use crate::domain::PricePoint;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    price: f64,
    #[serde(default)]
    adjusted_price: Option<f64>,
    #[serde(default)]
    dividend: Option<f64>,
}

/// Directory-of-CSVs provider.
pub struct CsvHistoryProvider {
    data_dir: PathBuf,
}

impl CsvHistoryProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn symbol_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}.csv"))
    }
}

impl PriceHistoryProvider for CsvHistoryProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn monthly_history(&self, symbol: &str) -> Result<Vec<PricePoint>, DataError> {
        let path = self.symbol_path(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| DataError::Other(format!("open {}: {e}", path.display())))?;

        let mut points = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|e| {
                DataError::ValidationError(format!("bad row in {}: {e}", path.display()))
            })?;
            points.push(PricePoint {
                date: row.date,
                price: row.price,
                adjusted_price: row.adjusted_price,
                dividend: row.dividend.unwrap_or(0.0),
            });
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}
