//! Terminal plotting helpers for the plain-text report.

pub mod ascii;

pub use ascii::render_ascii_line_chart;
