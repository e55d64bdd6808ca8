//! Offline price source: a seeded geometric random walk on weekdays.
//!
//! Used by `--demo` and by tests that need a realistic-looking series without
//! the network. The same seed, symbol and range always yield the same rows.

use chrono::{Datelike, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::PriceSource;
use crate::domain::{DateRange, PriceRow, PriceSeries, Symbol};
use crate::error::FetchError;

/// Daily log-return drift and volatility, roughly a gold ETF.
const DAILY_DRIFT: f64 = 0.0004;
const DAILY_VOL: f64 = 0.009;
const START_PRICE: f64 = 185.0;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    seed: u64,
}

impl SyntheticSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, symbol: &Symbol, range: DateRange) -> StdRng {
        StdRng::seed_from_u64(stream_seed(self.seed, symbol, range))
    }
}

/// FNV-1a over the seed, symbol and range bounds. Stable across toolchains,
/// unlike `DefaultHasher`.
fn stream_seed(seed: u64, symbol: &Symbol, range: DateRange) -> u64 {
    seed.to_le_bytes()
        .iter()
        .chain(symbol.as_str().as_bytes())
        .chain(&range.start.num_days_from_ce().to_le_bytes())
        .chain(&range.end.num_days_from_ce().to_le_bytes())
        .fold(FNV_OFFSET, |h, &b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME))
}

impl PriceSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic random walk (demo)"
    }

    fn fetch(&self, symbol: &Symbol, range: DateRange) -> Result<PriceSeries, FetchError> {
        let mut rng = self.rng_for(symbol, range);
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| FetchError::Provider(format!("noise distribution error: {e}")))?;

        let mut rows = Vec::new();
        let mut close = START_PRICE;
        for date in range.start.iter_days().take_while(|d| *d <= range.end) {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }

            let open = close;
            let z: f64 = normal.sample(&mut rng);
            close = open * (DAILY_DRIFT + DAILY_VOL * z).exp();

            let wick: f64 = normal.sample(&mut rng);
            let spread = (wick.abs() * DAILY_VOL * 0.5).min(0.05);
            let high = open.max(close) * (1.0 + spread);
            let low = open.min(close) * (1.0 - spread);
            let volume = rng.gen_range(5_000_000u64..12_000_000u64);

            rows.push(PriceRow {
                date,
                open: Some(round_cents(open)),
                high: Some(round_cents(high)),
                low: Some(round_cents(low)),
                close: Some(round_cents(close)),
                adj_close: Some(round_cents(close)),
                volume: Some(volume),
            });
        }

        tracing::debug!(%symbol, rows = rows.len(), "generated synthetic history");
        Ok(PriceSeries::new(symbol.clone(), rows))
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::LookbackDays;
    use crate::metrics::derive;

    fn range() -> DateRange {
        DateRange::ending(
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            LookbackDays::new(90).unwrap(),
        )
    }

    #[test]
    fn same_inputs_give_same_series() {
        let sym = Symbol::parse("GLD").unwrap();
        let a = SyntheticSource::new(7).fetch(&sym, range()).unwrap();
        let b = SyntheticSource::new(7).fetch(&sym, range()).unwrap();
        assert_eq!(a, b);

        let c = SyntheticSource::new(8).fetch(&sym, range()).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn stream_seed_is_pinned() {
        let sym = Symbol::parse("GLD").unwrap();
        let r = range();
        // 2025-04-01..=2025-06-30; a changed value means demo series changed.
        assert_eq!(stream_seed(7, &sym, r), 0x21fa_1eed_e9c7_8f41);
        assert_ne!(stream_seed(7, &sym, r), stream_seed(7, &Symbol::parse("SPY").unwrap(), r));

        let shifted = DateRange {
            start: r.start.succ_opt().unwrap(),
            end: r.end,
        };
        assert_ne!(stream_seed(7, &sym, r), stream_seed(7, &sym, shifted));
    }

    #[test]
    fn only_weekdays_within_range() {
        let sym = Symbol::parse("GLD").unwrap();
        let r = range();
        let series = SyntheticSource::new(1).fetch(&sym, r).unwrap();
        assert!(!series.is_empty());
        for row in series.rows() {
            assert!(row.date >= r.start && row.date <= r.end);
            assert!(!matches!(row.date.weekday(), Weekday::Sat | Weekday::Sun));
            let (lo, hi, c) = (row.low.unwrap(), row.high.unwrap(), row.close.unwrap());
            assert!(lo <= c && c <= hi, "{lo} <= {c} <= {hi}");
        }
    }

    #[test]
    fn synthetic_series_derives_metrics() {
        let sym = Symbol::parse("GLD").unwrap();
        let series = SyntheticSource::new(42).fetch(&sym, range()).unwrap();
        assert!(derive(&series).summary().is_some());
    }
}
