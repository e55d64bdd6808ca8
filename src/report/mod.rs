//! Plain-text rendering of a dashboard pass.
//!
//! We keep formatting code in one place so:
//! - the pipeline stays clean and testable
//! - output changes are localized (snapshot-friendly)

use chrono::NaiveDate;

use crate::domain::PriceRow;
use crate::present::{Delta, Presenter, Trend};

/// Presenter that accumulates a plain-text report.
#[derive(Debug, Clone)]
pub struct TextReport {
    out: String,
    plot_width: usize,
    plot_height: usize,
}

impl TextReport {
    pub fn new(plot_width: usize, plot_height: usize) -> Self {
        Self {
            out: String::new(),
            plot_width,
            plot_height,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl Presenter for TextReport {
    fn title(&mut self, title: &str, caption: &str) {
        self.out.push_str(&format!("=== {title} ===\n"));
        self.out.push_str(caption);
        self.out.push_str("\n\n");
    }

    fn subheader(&mut self, text: &str) {
        self.out.push_str(&format!("{text}:\n"));
    }

    fn line_chart(&mut self, title: &str, points: &[(NaiveDate, f64)]) {
        self.out.push_str(&format!("{title}:\n"));
        self.out.push_str(&crate::plot::render_ascii_line_chart(
            points,
            self.plot_width,
            self.plot_height,
        ));
        self.out.push('\n');
    }

    fn metric(&mut self, label: &str, value: &str, delta: Option<&Delta>) {
        let line = match delta {
            Some(delta) => format!("  {label:<32} {value:>12}  ({} {})", trend_marker(delta.trend), delta.text),
            None => format!("  {label:<32} {value:>12}"),
        };
        self.out.push_str(&line);
        self.out.push('\n');
    }

    fn table(&mut self, title: &str, rows: &[PriceRow]) {
        self.out.push('\n');
        self.out.push_str(&format!("{title}:\n"));
        self.out.push_str(&format_table(rows));
    }

    fn warning(&mut self, message: &str) {
        self.out.push_str(&format!("WARNING: {message}\n"));
    }

    fn error(&mut self, message: &str) {
        self.out.push_str(&format!("ERROR: {message}\n"));
    }
}

fn trend_marker(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "▲",
        Trend::Down => "▼",
        Trend::Flat => "=",
    }
}

/// Fixed-width table of daily rows; absent values print as `-`.
pub fn format_table(rows: &[PriceRow]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12}",
            "date", "open", "high", "low", "close", "adj_close", "volume"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<10} {:-<10} {:-<10} {:-<10} {:-<10} {:-<10} {:-<12}",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12}",
                r.date.format("%Y-%m-%d").to_string(),
                fmt_price(r.open),
                fmt_price(r.high),
                fmt_price(r.low),
                fmt_price(r.close),
                fmt_price(r.adj_close),
                r.volume.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_price(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::app::pipeline::DashboardView;
    use crate::domain::{LookbackDays, PriceSeries, Symbol};
    use crate::error::FetchError;
    use crate::metrics::derive;
    use crate::present::{EMPTY_SERIES_WARNING, render_pass};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn view(rows: Vec<PriceRow>, fetch_error: Option<FetchError>) -> DashboardView {
        let symbol = Symbol::parse("GLD").unwrap();
        let series = PriceSeries::new(symbol.clone(), rows);
        DashboardView {
            validation: derive(&series),
            symbol,
            lookback: LookbackDays::new(365).unwrap(),
            source_name: "test".to_string(),
            series: Arc::new(series),
            fetch_error,
            tail_rows: 10,
        }
    }

    #[test]
    fn table_formats_missing_values_as_dash() {
        let rows = vec![
            PriceRow {
                date: d(2),
                open: Some(240.1),
                high: Some(242.0),
                low: Some(239.5),
                close: Some(241.3),
                adj_close: Some(241.3),
                volume: Some(8_100_000),
            },
            PriceRow::close_only(d(3), None),
        ];
        let expected = concat!(
            "date             open       high        low      close  adj_close       volume\n",
            "---------- ---------- ---------- ---------- ---------- ---------- ------------\n",
            "2025-01-02     240.10     242.00     239.50     241.30     241.30      8100000\n",
            "2025-01-03          -          -          -          -          -            -\n",
        );
        assert_eq!(format_table(&rows), expected);
    }

    #[test]
    fn report_contains_metrics_and_table() {
        let rows = vec![
            PriceRow::close_only(d(1), Some(100.0)),
            PriceRow::close_only(d(2), Some(105.0)),
        ];
        let mut report = TextReport::new(40, 8);
        render_pass(&view(rows, None), &mut report);
        let txt = report.into_string();

        assert!(txt.starts_with("=== Price Tracker: GLD ===\n"));
        assert!(txt.contains("Price Chart for GLD:\nPlot: 2025-01-01 .. 2025-01-02"));
        assert!(txt.contains("Latest Close Price"));
        assert!(txt.contains("$105.00"));
        assert!(txt.contains("$5.00  (▲ 5.00%)"));
        assert!(txt.contains("2025-01-01 to 2025-01-02"));
        assert!(txt.contains("Raw Data Table (Last 10 Days):\ndate"));
        assert!(!txt.contains("WARNING"));
    }

    #[test]
    fn report_for_failed_fetch_has_error_and_warning() {
        let mut report = TextReport::new(40, 8);
        render_pass(
            &view(vec![], Some(FetchError::RateLimited)),
            &mut report,
        );
        let txt = report.as_str();
        assert!(txt.contains("ERROR: Error fetching data for GLD: provider rate limit reached\n"));
        assert!(txt.contains(&format!("WARNING: {EMPTY_SERIES_WARNING}\n")));
        assert!(!txt.contains("Plot:"));
    }
}
