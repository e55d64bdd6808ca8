//! Presentation contract and the single render pass that drives it.
//!
//! A render pass turns a [`DashboardView`] into calls on a [`Presenter`]. The
//! presenter is a pure sink: nothing flows back into the pipeline.
//!
//! Two presenters ship with the crate:
//!
//! - [`crate::report::TextReport`] writes a plain-text report
//! - [`Sheet`] records the calls so the TUI can lay them out

use chrono::NaiveDate;

use crate::app::pipeline::DashboardView;
use crate::domain::{PriceRow, ValidationResult};

/// Warning shown when no rows are available.
pub const EMPTY_SERIES_WARNING: &str =
    "Could not load financial data. Check the ticker symbol or your internet connection.";

/// Direction of a metric delta (drives colouring).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    pub text: String,
    pub trend: Trend,
}

impl Delta {
    pub fn percent(pct: f64) -> Self {
        let trend = if pct > 0.0 {
            Trend::Up
        } else if pct < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        };
        Self {
            text: format!("{pct:.2}%"),
            trend,
        }
    }
}

/// Rendering primitives a front-end must provide.
pub trait Presenter {
    fn title(&mut self, title: &str, caption: &str);
    fn subheader(&mut self, text: &str);
    fn line_chart(&mut self, title: &str, points: &[(NaiveDate, f64)]);
    fn metric(&mut self, label: &str, value: &str, delta: Option<&Delta>);
    fn table(&mut self, title: &str, rows: &[PriceRow]);
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// Drive `out` through one full dashboard render.
pub fn render_pass(view: &DashboardView, out: &mut dyn Presenter) {
    out.title(
        &format!("Price Tracker: {}", view.symbol),
        &format!(
            "Fetching {} of daily data for {} from {}.",
            view.lookback, view.symbol, view.source_name
        ),
    );

    if let Some(err) = &view.fetch_error {
        out.error(&format!("Error fetching data for {}: {err}", view.symbol));
    }

    if view.series.is_empty() {
        out.warning(EMPTY_SERIES_WARNING);
        return;
    }

    out.line_chart(
        &format!("Price Chart for {}", view.symbol),
        &view.series.close_points(),
    );

    out.subheader("Latest Price and Summary");
    match &view.validation {
        ValidationResult::Ok(m) => {
            out.metric("Latest Close Price", &fmt_money(m.latest_close), None);
            out.metric(
                "Price Change (vs previous day)",
                &fmt_money(m.absolute_change),
                Some(&Delta::percent(m.percent_change)),
            );
            out.metric(
                "Data Period",
                &format!(
                    "{} to {}",
                    m.period_start.format("%Y-%m-%d"),
                    m.period_end.format("%Y-%m-%d")
                ),
                None,
            );
        }
        ValidationResult::Insufficient { valid_closes } => {
            out.warning(&format!(
                "Not enough closing prices to compute a daily change ({valid_closes} available, 2 needed)."
            ));
        }
        ValidationResult::NonNumeric(value) => {
            out.warning(&format!(
                "Closing price is not a usable number ({value}); metrics are unavailable."
            ));
        }
        ValidationResult::DivisionByZero { latest } => {
            out.warning(&format!(
                "Previous close is zero, so the percent change is undefined (latest close {}).",
                fmt_money(*latest)
            ));
        }
    }

    out.table(
        &format!("Raw Data Table (Last {} Days)", view.tail_rows),
        view.series.tail(view.tail_rows),
    );
}

pub fn fmt_money(v: f64) -> String {
    format!("${v:.2}")
}

/// One recorded presenter call.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title { title: String, caption: String },
    Subheader(String),
    Chart { title: String, points: Vec<(NaiveDate, f64)> },
    Metric { label: String, value: String, delta: Option<Delta> },
    Table { title: String, rows: Vec<PriceRow> },
    Warning(String),
    Error(String),
}

/// Presenter that records every call in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub blocks: Vec<Block>,
}

impl Sheet {
    pub fn from_view(view: &DashboardView) -> Self {
        let mut sheet = Self::default();
        render_pass(view, &mut sheet);
        sheet
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Error(msg) => Some(msg.as_str()),
            _ => None,
        })
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Warning(msg) => Some(msg.as_str()),
            _ => None,
        })
    }

    pub fn metrics(&self) -> impl Iterator<Item = (&str, &str, Option<&Delta>)> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Metric { label, value, delta } => Some((label.as_str(), value.as_str(), delta.as_ref())),
            _ => None,
        })
    }

    pub fn chart(&self) -> Option<(&str, &[(NaiveDate, f64)])> {
        self.blocks.iter().find_map(|b| match b {
            Block::Chart { title, points } => Some((title.as_str(), points.as_slice())),
            _ => None,
        })
    }

    pub fn table_block(&self) -> Option<(&str, &[PriceRow])> {
        self.blocks.iter().find_map(|b| match b {
            Block::Table { title, rows } => Some((title.as_str(), rows.as_slice())),
            _ => None,
        })
    }

    pub fn heading(&self) -> Option<(&str, &str)> {
        self.blocks.iter().find_map(|b| match b {
            Block::Title { title, caption } => Some((title.as_str(), caption.as_str())),
            _ => None,
        })
    }
}

impl Presenter for Sheet {
    fn title(&mut self, title: &str, caption: &str) {
        self.blocks.push(Block::Title {
            title: title.to_string(),
            caption: caption.to_string(),
        });
    }

    fn subheader(&mut self, text: &str) {
        self.blocks.push(Block::Subheader(text.to_string()));
    }

    fn line_chart(&mut self, title: &str, points: &[(NaiveDate, f64)]) {
        self.blocks.push(Block::Chart {
            title: title.to_string(),
            points: points.to_vec(),
        });
    }

    fn metric(&mut self, label: &str, value: &str, delta: Option<&Delta>) {
        self.blocks.push(Block::Metric {
            label: label.to_string(),
            value: value.to_string(),
            delta: delta.cloned(),
        });
    }

    fn table(&mut self, title: &str, rows: &[PriceRow]) {
        self.blocks.push(Block::Table {
            title: title.to_string(),
            rows: rows.to_vec(),
        });
    }

    fn warning(&mut self, message: &str) {
        self.blocks.push(Block::Warning(message.to_string()));
    }

    fn error(&mut self, message: &str) {
        self.blocks.push(Block::Error(message.to_string()));
    }
}
