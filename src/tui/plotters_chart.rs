//! Closing-price chart widget, drawn with Plotters into the Ratatui buffer.
//!
//! Dates arrive as day numbers (`NaiveDate::num_days_from_ce`) so Plotters can
//! treat the x axis as a plain `f64` range.

use plotters::prelude::*;
// `ratatui::style::Color` below shadows the prelude's trait of the same name.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Render-only description of a price chart. Bounds are computed by the caller.
pub struct PricePlottersChart<'a> {
    /// `(day number, close)` in date order.
    pub series: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: String,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl Widget for PricePlottersChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters refuses to build a chart in tiny areas.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are noise at terminal resolution; axes are enough.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(&self.y_label)
                .x_labels(4)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(255, 215, 0); // gold
            let marker_color = RGBColor(0, 255, 255);

            chart.draw_series(LineSeries::new(self.series.iter().copied(), &line_color))?;

            // Latest close as a flat reference line plus a marker on the last point.
            // Pixels, not circles: the backend mis-scales circle radii.
            if let Some(&(last_x, last_y)) = self.series.last() {
                chart.draw_series(LineSeries::new(
                    [(x0, last_y), (x1, last_y)],
                    &marker_color.mix(0.4),
                ))?;
                chart.draw_series(std::iter::once(Pixel::new((last_x, last_y), marker_color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
