//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - AQI trend: `*` line (broken across undefined points)
//! - category thresholds (50, 100): `.` rows, when inside the y-range

use chrono::{DateTime, Utc};

use crate::report::Assessment;

const THRESHOLDS: [f64; 2] = [50.0, 100.0];

/// Render the AQI trend, time on x and AQI on y.
pub fn render_trend_plot(trend: &[Assessment], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((t_min, t_max)) = time_range(trend) else {
        return "Plot: no defined AQI points\n".to_string();
    };
    let Some((y_min, y_max)) = aqi_range(trend) else {
        return "Plot: no defined AQI points\n".to_string();
    };
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Thresholds first so the trend overlays them.
    for threshold in THRESHOLDS {
        if (y_min..=y_max).contains(&threshold) {
            let row = map_y(threshold, y_min, y_max, height);
            grid[row].fill('.');
        }
    }

    let mut prev = None;
    for a in trend {
        let Some(aqi) = a.aqi else {
            prev = None;
            continue;
        };
        let x = map_x(seconds(a.timestamp), t_min, t_max, width);
        let y = map_y(f64::from(aqi), y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, y, '*'),
            None => grid[y][x] = '*',
        }
        prev = Some((x, y));
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: time=[{}, {}] | AQI=[{y_min:.1}, {y_max:.1}] | * AQI, . 50/100\n",
        format_time(t_min),
        format_time(t_max)
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn seconds(ts: DateTime<Utc>) -> f64 {
    ts.timestamp() as f64
}

fn format_time(secs: f64) -> String {
    DateTime::from_timestamp(secs as i64, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "?".to_string())
}

fn time_range(trend: &[Assessment]) -> Option<(f64, f64)> {
    let mut min_t = f64::INFINITY;
    let mut max_t = f64::NEG_INFINITY;
    for a in trend.iter().filter(|a| a.aqi.is_some()) {
        let t = seconds(a.timestamp);
        min_t = min_t.min(t);
        max_t = max_t.max(t);
    }
    if !min_t.is_finite() || !max_t.is_finite() {
        return None;
    }
    // A single point still needs a non-empty span.
    if max_t > min_t { Some((min_t, max_t)) } else { Some((min_t, min_t + 1.0)) }
}

fn aqi_range(trend: &[Assessment]) -> Option<(f64, f64)> {
    let min = trend.iter().filter_map(|a| a.aqi).min()?;
    let max = trend.iter().filter_map(|a| a.aqi).max()?;
    Some((f64::from(min), f64::from(max)))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1.0);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham).
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
