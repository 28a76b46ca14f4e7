//! Market event annotations — display metadata joined to a series by month.
//!
//! Annotations are deliberately a separate type rather than optional fields
//! on `PricePoint`/`PerformanceRecord`: they carry no arithmetic meaning and
//! are attached by a join on calendar month for display layers that want them.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::price::PricePoint;

/// How disruptive a market event was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    Medium,
    Major,
}

/// A notable market event coinciding with a month in a price series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAnnotation {
    /// Date of the price point the event is attached to.
    pub date: NaiveDate,
    pub label: String,
    pub severity: EventSeverity,
}

/// Curated table of major market events, one entry per event date.
const MARKET_EVENTS: &[(i32, u32, u32, &str, EventSeverity)] = &[
    (2008, 9, 15, "Lehman Brothers bankruptcy", EventSeverity::Major),
    (2010, 5, 6, "Flash Crash", EventSeverity::Medium),
    (2011, 8, 5, "US credit rating downgrade", EventSeverity::Medium),
    (2015, 8, 24, "Chinese Black Monday", EventSeverity::Medium),
    (2016, 6, 24, "Brexit", EventSeverity::Medium),
    (2018, 12, 24, "Market plunge", EventSeverity::Medium),
    (2020, 3, 16, "COVID-19 crash", EventSeverity::Major),
    (2022, 1, 24, "Market correction", EventSeverity::Medium),
];

/// Join the curated event table to a price series by calendar month.
///
/// Returns one annotation per series point whose month matches an event,
/// carrying the point's own date so callers can join back on it.
pub fn annotate(series: &[PricePoint]) -> Vec<MarketAnnotation> {
    series
        .iter()
        .filter_map(|point| {
            MARKET_EVENTS
                .iter()
                .find(|(y, m, _, _, _)| point.date.year() == *y && point.date.month() == *m)
                .map(|(_, _, _, label, severity)| MarketAnnotation {
                    date: point.date,
                    label: (*label).to_string(),
                    severity: *severity,
                })
        })
        .collect()
}
