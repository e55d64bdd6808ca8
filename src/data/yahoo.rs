//! Yahoo Finance v8 chart API integration (daily history).

use std::time::Duration;

use chrono::{DateTime, Days};
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::PriceSource;
use crate::domain::{DateRange, PriceRow, PriceSeries, Symbol};
use crate::error::{AppError, FetchError};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// Yahoo rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub struct YahooSource {
    client: Client,
    base_url: String,
}

impl YahooSource {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        Self::with_base_url(BASE_URL, timeout)
    }

    /// Point the source at another chart endpoint (mirrors, local stubs).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn chart_url(&self, symbol: &Symbol) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::Transport(format!("invalid base URL '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport(format!("base URL '{}' cannot take a path", self.base_url)))?
            .push(symbol.as_str());
        Ok(url)
    }
}

impl PriceSource for YahooSource {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn fetch(&self, symbol: &Symbol, range: DateRange) -> Result<PriceSeries, FetchError> {
        let (period1, period2) = period_bounds(range);
        let url = self.chart_url(symbol)?;

        tracing::info!(%symbol, start = %range.start, end = %range.end, "requesting daily history");

        let resp = self
            .client
            .get(url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .map_err(classify_transport)?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::UnknownSymbol(symbol.to_string()));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().map_err(classify_transport)?;
        let series = parse_chart_response(symbol, &body)?;
        tracing::info!(%symbol, rows = series.len(), "received daily history");
        Ok(series)
    }
}

fn classify_transport(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(err.to_string())
    }
}

/// Unix-second bounds covering every day of `range` (end day included).
fn period_bounds(range: DateRange) -> (i64, i64) {
    let start = range.start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
    let end_exclusive = range
        .end
        .checked_add_days(Days::new(1))
        .unwrap_or(range.end)
        .and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .timestamp();
    (start, end_exclusive)
}

/// Decode a chart response body into a series.
///
/// A response without a result or without timestamps decodes to an empty
/// series; null prices stay `None`.
pub fn parse_chart_response(symbol: &Symbol, body: &str) -> Result<PriceSeries, FetchError> {
    let parsed: ChartResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if let Some(err) = parsed.chart.error {
        if err.code.eq_ignore_ascii_case("Not Found") {
            return Err(FetchError::UnknownSymbol(symbol.to_string()));
        }
        return Err(FetchError::Provider(format!("{}: {}", err.code, err.description)));
    }

    let Some(result) = parsed.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::empty(symbol.clone()));
    };

    let offset = result.meta.gmtoffset.unwrap_or(0);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let date = ts
            .checked_add(offset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .ok_or_else(|| FetchError::Decode(format!("timestamp {ts} out of range")))?
            .date_naive();
        rows.push(PriceRow {
            date,
            open: at(&quote.open, i),
            high: at(&quote.high, i),
            low: at(&quote.low, i),
            close: at(&quote.close, i),
            adj_close: at(&adjclose, i),
            volume: at(&quote.volume, i).and_then(|v| u64::try_from(v).ok()),
        });
    }

    Ok(PriceSeries::new(symbol.clone(), rows))
}

fn at<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}
