//! Shared domain types.
//!
//! These types are intentionally kept small and cloneable so they can be:
//!
//! - cached across render passes
//! - handed to either front-end (text report or TUI)
//! - exported to CSV

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Default instrument: SPDR Gold Shares ETF, used as a proxy for gold prices.
pub const DEFAULT_SYMBOL: &str = "GLD";

/// Lookback presets the TUI cycles through.
pub const LOOKBACK_PRESETS: [u32; 6] = [30, 90, 180, 365, 730, 1825];

/// A validated ticker symbol (upper-cased, Yahoo ticker alphabet).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptySymbol);
        }
        let upper = trimmed.to_ascii_uppercase();
        let ok = upper
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
        if !ok {
            return Err(ParseError::InvalidSymbol(trimmed.to_string()));
        }
        Ok(Self(upper))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

/// Number of calendar days before today to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LookbackDays(u32);

impl LookbackDays {
    pub fn new(days: u32) -> Result<Self, ParseError> {
        if days == 0 {
            return Err(ParseError::ZeroLookback);
        }
        Ok(Self(days))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Next preset strictly above the current value, wrapping to the smallest.
    pub fn next_preset(self) -> Self {
        let next = LOOKBACK_PRESETS
            .iter()
            .copied()
            .find(|&d| d > self.0)
            .unwrap_or(LOOKBACK_PRESETS[0]);
        Self(next)
    }

    /// Previous preset strictly below the current value, wrapping to the largest.
    pub fn prev_preset(self) -> Self {
        let prev = LOOKBACK_PRESETS
            .iter()
            .rev()
            .copied()
            .find(|&d| d < self.0)
            .unwrap_or(LOOKBACK_PRESETS[LOOKBACK_PRESETS.len() - 1]);
        Self(prev)
    }
}

impl fmt::Display for LookbackDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.0)
    }
}

impl FromStr for LookbackDays {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days = s
            .trim()
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidLookback(s.to_string()))?;
        Self::new(days)
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// `[today - lookback, today]`.
    pub fn ending(today: NaiveDate, lookback: LookbackDays) -> Self {
        let start = today
            .checked_sub_days(chrono::Days::new(u64::from(lookback.get())))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }
}

/// One daily record as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<u64>,
}

impl PriceRow {
    /// Row with only a date and a close, the minimum the metrics need.
    pub fn close_only(date: NaiveDate, close: Option<f64>) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            adj_close: None,
            volume: None,
        }
    }
}

/// Daily price history for one symbol, dates strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: Symbol,
    rows: Vec<PriceRow>,
}

impl PriceSeries {
    /// Build a series from provider rows.
    ///
    /// Rows are sorted by date; when a date appears more than once the last
    /// occurrence wins (Yahoo repeats the live bar for the current session).
    pub fn new(symbol: Symbol, mut rows: Vec<PriceRow>) -> Self {
        rows.sort_by_key(|r| r.date);
        let mut out: Vec<PriceRow> = Vec::with_capacity(rows.len());
        for row in rows {
            match out.last_mut() {
                Some(last) if last.date == row.date => *last = row,
                _ => out.push(row),
            }
        }
        Self { symbol, rows: out }
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            rows: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// Last `n` rows (all rows if fewer).
    pub fn tail(&self, n: usize) -> &[PriceRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }

    /// `(date, close)` pairs with a finite close, for charting.
    pub fn close_points(&self) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.close.filter(|c| c.is_finite()).map(|c| (r.date, c)))
            .collect()
    }
}

/// Headline numbers shown above the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub latest_close: f64,
    pub previous_close: f64,
    pub absolute_change: f64,
    pub percent_change: f64,
    pub latest_date: NaiveDate,
    pub previous_date: NaiveDate,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// Outcome of validating a series for the metrics row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidationResult {
    /// Fewer than two present closing prices.
    Insufficient { valid_closes: usize },
    /// A close was present but not a finite number.
    NonNumeric(f64),
    /// The previous close is zero, so the percent change is undefined.
    DivisionByZero { latest: f64 },
    Ok(MetricSummary),
}

impl ValidationResult {
    pub fn summary(&self) -> Option<&MetricSummary> {
        match self {
            ValidationResult::Ok(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Runtime configuration assembled from CLI flags and the environment.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub symbol: Symbol,
    pub lookback: LookbackDays,
    pub tail_rows: usize,
    pub timeout: Duration,
    /// `None` caches failed fetches for the whole session.
    pub failure_ttl: Option<Duration>,
    pub demo: bool,
    pub seed: u64,
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn symbol_is_trimmed_and_uppercased() {
        assert_eq!(Symbol::parse("  gld ").unwrap().as_str(), "GLD");
        assert_eq!(Symbol::parse("^gspc").unwrap().as_str(), "^GSPC");
        assert_eq!(Symbol::parse("GC=F").unwrap().as_str(), "GC=F");
    }

    #[test]
    fn symbol_rejects_empty_and_junk() {
        assert_eq!(Symbol::parse("   "), Err(ParseError::EmptySymbol));
        assert!(matches!(Symbol::parse("GL D"), Err(ParseError::InvalidSymbol(_))));
        assert!(matches!(Symbol::parse("GLD/"), Err(ParseError::InvalidSymbol(_))));
    }

    #[test]
    fn lookback_rejects_zero() {
        assert_eq!(LookbackDays::new(0), Err(ParseError::ZeroLookback));
        assert_eq!("0".parse::<LookbackDays>(), Err(ParseError::ZeroLookback));
        assert!(matches!("-3".parse::<LookbackDays>(), Err(ParseError::InvalidLookback(_))));
        assert_eq!("365".parse::<LookbackDays>().unwrap().get(), 365);
    }

    #[test]
    fn lookback_presets_wrap() {
        let days = LookbackDays::new(365).unwrap();
        assert_eq!(days.next_preset().get(), 730);
        assert_eq!(days.prev_preset().get(), 180);
        assert_eq!(LookbackDays::new(1825).unwrap().next_preset().get(), 30);
        assert_eq!(LookbackDays::new(30).unwrap().prev_preset().get(), 1825);
        // Off-preset values snap to the neighbouring preset.
        assert_eq!(LookbackDays::new(100).unwrap().next_preset().get(), 180);
        assert_eq!(LookbackDays::new(100).unwrap().prev_preset().get(), 90);
    }

    #[test]
    fn date_range_spans_lookback() {
        let range = DateRange::ending(d(2025, 3, 1), LookbackDays::new(365).unwrap());
        assert_eq!(range.start, d(2024, 3, 1));
        assert_eq!(range.end, d(2025, 3, 1));
    }

    #[test]
    fn series_sorts_and_collapses_duplicate_dates() {
        let sym = Symbol::parse("GLD").unwrap();
        let series = PriceSeries::new(
            sym,
            vec![
                PriceRow::close_only(d(2025, 1, 3), Some(3.0)),
                PriceRow::close_only(d(2025, 1, 1), Some(1.0)),
                PriceRow::close_only(d(2025, 1, 3), Some(3.5)),
                PriceRow::close_only(d(2025, 1, 2), None),
            ],
        );
        let dates: Vec<_> = series.rows().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2025, 1, 1), d(2025, 1, 2), d(2025, 1, 3)]);
        assert_eq!(series.rows()[2].close, Some(3.5));
        assert_eq!(series.close_points().len(), 2);
    }

    #[test]
    fn tail_returns_last_rows() {
        let sym = Symbol::parse("GLD").unwrap();
        let rows = (1..=15)
            .map(|i| PriceRow::close_only(d(2025, 1, i), Some(i as f64)))
            .collect();
        let series = PriceSeries::new(sym, rows);
        let tail = series.tail(10);
        assert_eq!(tail.len(), 10);
        assert_eq!(tail[0].date, d(2025, 1, 6));
        assert_eq!(series.tail(100).len(), 15);
    }
}
