//! Shared "load" logic used by the text report, the TUI and the exporter.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> cache -> validate/derive -> view
//!
//! The front-ends can then focus on presentation.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::cache::{CachePolicy, ResultCache};
use crate::data::PriceSource;
use crate::domain::{DateRange, LookbackDays, PriceSeries, Symbol, ValidationResult};
use crate::error::FetchError;
use crate::metrics::derive;

/// Cache key: the exact fetch parameters.
pub type SeriesKey = (Symbol, LookbackDays);

pub type SeriesCache = ResultCache<SeriesKey, Arc<PriceSeries>, FetchError>;

/// Fetch `lookback` days of history ending `today`.
pub fn fetch(
    source: &dyn PriceSource,
    symbol: &Symbol,
    lookback: LookbackDays,
    today: NaiveDate,
) -> Result<PriceSeries, FetchError> {
    source.fetch(symbol, DateRange::ending(today, lookback))
}

/// Everything one render pass needs.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub symbol: Symbol,
    pub lookback: LookbackDays,
    pub source_name: String,
    /// Empty when the fetch failed.
    pub series: Arc<PriceSeries>,
    pub fetch_error: Option<FetchError>,
    pub validation: ValidationResult,
    pub tail_rows: usize,
}

/// A fixed-symbol dashboard backed by a source and a result cache.
pub struct Dashboard {
    source: Box<dyn PriceSource>,
    cache: SeriesCache,
    symbol: Symbol,
    tail_rows: usize,
}

impl Dashboard {
    pub fn new(source: Box<dyn PriceSource>, symbol: Symbol, policy: CachePolicy, tail_rows: usize) -> Self {
        Self {
            source,
            cache: ResultCache::new(policy),
            symbol,
            tail_rows,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Build the view for `lookback`, fetching only on a cache miss.
    ///
    /// A failed fetch never escapes: it is recorded on the view and the
    /// series is treated as empty.
    pub fn load(&self, lookback: LookbackDays, today: NaiveDate) -> DashboardView {
        let key = (self.symbol.clone(), lookback);
        let fetched = self.cache.get_or_fetch(&key, || {
            fetch(self.source.as_ref(), &self.symbol, lookback, today).map(Arc::new)
        });

        let (series, fetch_error) = match fetched {
            Ok(series) => (series, None),
            Err(err) => {
                tracing::warn!(symbol = %self.symbol, %lookback, error = %err, "fetch failed");
                (Arc::new(PriceSeries::empty(self.symbol.clone())), Some(err))
            }
        };

        let validation = derive(&series);
        DashboardView {
            symbol: self.symbol.clone(),
            lookback,
            source_name: self.source.name().to_string(),
            series,
            fetch_error,
            validation,
            tail_rows: self.tail_rows,
        }
    }

    /// Drop the cached result for `lookback` so the next load refetches.
    pub fn invalidate(&self, lookback: LookbackDays) -> bool {
        self.cache.invalidate(&(self.symbol.clone(), lookback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::PriceRow;

    /// Scripted source: replays queued results and records calls.
    struct ScriptedSource {
        calls: AtomicUsize,
        ranges: Mutex<Vec<DateRange>>,
        results: Mutex<Vec<Result<Vec<Option<f64>>, FetchError>>>,
    }

    impl ScriptedSource {
        fn new(results: Vec<Result<Vec<Option<f64>>, FetchError>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                ranges: Mutex::new(Vec::new()),
                results: Mutex::new(results),
            }
        }
    }

    impl PriceSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        fn fetch(&self, symbol: &Symbol, range: DateRange) -> Result<PriceSeries, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.ranges.lock().unwrap().push(range);
            let next = self.results.lock().unwrap().remove(0)?;
            let rows = next
                .into_iter()
                .enumerate()
                .map(|(i, c)| {
                    let date = range.start + chrono::Days::new(i as u64);
                    PriceRow::close_only(date, c)
                })
                .collect();
            Ok(PriceSeries::new(symbol.clone(), rows))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn dashboard(source: ScriptedSource, policy: CachePolicy) -> (Dashboard, Arc<ScriptedSource>) {
        // Share the scripted source between the dashboard and the test.
        struct Shared(Arc<ScriptedSource>);
        impl PriceSource for Shared {
            fn name(&self) -> &str {
                self.0.name()
            }
            fn fetch(&self, symbol: &Symbol, range: DateRange) -> Result<PriceSeries, FetchError> {
                self.0.fetch(symbol, range)
            }
        }

        let source = Arc::new(source);
        let dash = Dashboard::new(
            Box::new(Shared(Arc::clone(&source))),
            Symbol::parse("GLD").unwrap(),
            policy,
            10,
        );
        (dash, source)
    }

    #[test]
    fn load_derives_metrics_and_requests_lookback_window() {
        let (dash, source) = dashboard(
            ScriptedSource::new(vec![Ok(vec![Some(100.0), Some(105.0)])]),
            CachePolicy::session(),
        );
        let view = dash.load(LookbackDays::new(365).unwrap(), today());

        assert!(view.fetch_error.is_none());
        let m = view.validation.summary().copied().unwrap();
        assert!((m.percent_change - 5.0).abs() < 1e-9);

        let ranges = source.ranges.lock().unwrap();
        assert_eq!(ranges[0].end, today());
        assert_eq!(ranges[0].start, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn repeated_loads_hit_the_cache() {
        let (dash, source) = dashboard(
            ScriptedSource::new(vec![Ok(vec![Some(1.0), Some(2.0)])]),
            CachePolicy::session(),
        );
        let days = LookbackDays::new(365).unwrap();
        let a = dash.load(days, today());
        let b = dash.load(days, today());
        assert!(Arc::ptr_eq(&a.series, &b.series));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fetch_failure_degrades_to_empty_series() {
        let (dash, _source) = dashboard(
            ScriptedSource::new(vec![Err(FetchError::Transport("connection refused".into()))]),
            CachePolicy::session(),
        );
        let view = dash.load(LookbackDays::new(365).unwrap(), today());
        assert!(view.series.is_empty());
        assert_eq!(
            view.fetch_error,
            Some(FetchError::Transport("connection refused".into()))
        );
        assert_eq!(view.validation, ValidationResult::Insufficient { valid_closes: 0 });
    }

    #[test]
    fn invalidate_triggers_refetch_after_failure() {
        let (dash, source) = dashboard(
            ScriptedSource::new(vec![
                Err(FetchError::Timeout),
                Ok(vec![Some(10.0), Some(11.0)]),
            ]),
            CachePolicy::session(),
        );
        let days = LookbackDays::new(90).unwrap();
        assert!(dash.load(days, today()).fetch_error.is_some());
        // Failure is cached for the session...
        assert!(dash.load(days, today()).fetch_error.is_some());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        // ...until explicitly invalidated.
        assert!(dash.invalidate(days));
        let view = dash.load(days, today());
        assert!(view.fetch_error.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
