//! Market-data sources.
//!
//! - Yahoo Finance daily chart history (`yahoo`)
//! - seeded offline random walk for demos and tests (`synthetic`)

use crate::domain::{DateRange, PriceSeries, Symbol};
use crate::error::FetchError;

pub mod synthetic;
pub mod yahoo;

pub use synthetic::SyntheticSource;
pub use yahoo::YahooSource;

/// A provider of daily price history.
pub trait PriceSource: Send + Sync {
    /// Human-readable provider name (shown as the dashboard caption).
    fn name(&self) -> &str;

    /// Daily rows for `symbol` within `range`. The provider may return fewer
    /// rows than calendar days (weekends, holidays).
    fn fetch(&self, symbol: &Symbol, range: DateRange) -> Result<PriceSeries, FetchError>;
}
