//! Domain types for DCA Lab

pub mod annotation;
pub mod price;
pub mod record;

pub use annotation::{annotate, EventSeverity, MarketAnnotation};
pub use price::{is_monthly_series, PricePoint};
pub use record::PerformanceRecord;

/// Symbol type alias
pub type Symbol = String;
