//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal or a log file
//! - deterministic output (helpful for golden tests)
//!
//! The close series is drawn as a connected `*` line; x is calendar time, so
//! weekend gaps stretch the line rather than compress it.

use chrono::NaiveDate;

/// Render `points` (date ascending) as a `width` x `height` character grid,
/// preceded by a one-line header with the plotted ranges.
pub fn render_ascii_line_chart(points: &[(NaiveDate, f64)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((first, last)) = points.first().zip(points.last()) else {
        return "Plot: no data\n".to_string();
    };
    let (d0, d1) = (first.0, last.0);
    let x_span = (d1 - d0).num_days().max(1) as f64;

    let (y_min, y_max) = y_range(points).unwrap_or((first.1 - 1.0, first.1 + 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let mut prev = None;
    for &(date, y) in points {
        let x = map_x((date - d0).num_days() as f64, x_span, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, yy, '*'),
            None => grid[yy][x] = '*',
        }
        prev = Some((x, yy));
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {d0} .. {d1} | close=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn y_range(points: &[(NaiveDate, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(offset_days: f64, span_days: f64, width: usize) -> usize {
    let u = (offset_days / span_days).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn rising_line_runs_bottom_left_to_top_right() {
        let txt = render_ascii_line_chart(&[(d(1), 100.0), (d(10), 110.0)], 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "Plot: 2025-01-01 .. 2025-01-10 | close=[99.50, 110.50]");
        assert_eq!(lines.len(), 6);
        assert!(lines[1].ends_with('*'));
        assert_eq!(lines[1].len(), 10);
        assert!(lines[5].starts_with('*'));
    }

    #[test]
    fn flat_series_is_drawn_mid_height() {
        let txt = render_ascii_line_chart(&[(d(1), 5.0), (d(2), 5.0), (d(3), 5.0)], 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[3], "**********");
        assert!(lines[1].is_empty() && lines[5].is_empty());
    }

    #[test]
    fn empty_input_has_placeholder() {
        assert_eq!(render_ascii_line_chart(&[], 20, 5), "Plot: no data\n");
    }
}
