//! Plotters-powered AQI trend chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
// `Color` below is ratatui's; this keeps plotters' `mix` in scope.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::aqi::{Category, CategoryColor};

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call (see
/// `TrendSeries`), so `render()` only draws.
pub struct AqiPlottersChart<'a> {
    /// Contiguous runs of defined AQI values, drawn as lines.
    pub segments: &'a [Vec<(f64, f64)>],
    /// Every defined point with its category color.
    pub points: &'a [(f64, f64, CategoryColor)],
    /// Category thresholds drawn as horizontal guides.
    pub thresholds: &'a [(f64, CategoryColor)],
    /// X bounds (days relative to the fetch time).
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

fn rgb(color: CategoryColor) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

impl Widget for AqiPlottersChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
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

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are clutter at terminal resolution.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(5)
                .y_labels(5)
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for &(level, color) in self.thresholds {
                chart.draw_series(LineSeries::new(
                    [(x0, level), (x1, level)],
                    &rgb(color).mix(0.5),
                ))?;
            }

            let trend_color = RGBColor(0, 255, 255); // cyan
            for segment in self.segments {
                chart.draw_series(LineSeries::new(segment.iter().copied(), &trend_color))?;
            }

            // `Circle` radii are mapped incorrectly by the ratatui backend; a
            // colored `Pixel` is a reliable dot.
            chart.draw_series(
                self.points
                    .iter()
                    .map(|&(x, y, color)| Pixel::new((x, y), rgb(color))),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Chart-ready data for a trend.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub segments: Vec<Vec<(f64, f64)>>,
    pub points: Vec<(f64, f64, CategoryColor)>,
    pub thresholds: Vec<(f64, CategoryColor)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

/// Upper edges of every category but the last, as chart guides.
fn category_thresholds() -> Vec<(f64, CategoryColor)> {
    Category::ALL
        .iter()
        .zip(Category::ALL.iter().skip(1))
        .map(|(&lower, &upper)| (upper_edge(lower), upper.color()))
        .collect()
}

fn upper_edge(category: Category) -> f64 {
    match category {
        Category::Good => 50.0,
        Category::Moderate => 100.0,
        Category::Unhealthy => f64::INFINITY,
    }
}

/// Build chart series from a trend.
///
/// `points` are `(timestamp seconds, aqi)` pairs in time order, `None` for
/// undefined points. X values are days relative to `end_secs`, so the window
/// spans `[-days, 0]`.
pub fn trend_series(points: &[(i64, Option<i32>)], end_secs: i64, days: u32) -> TrendSeries {
    let to_x = |t: i64| (t - end_secs) as f64 / 86_400.0;

    let mut segments: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    let mut dots = Vec::new();
    let mut y_max: f64 = 0.0;

    for &(t, aqi) in points {
        match aqi {
            Some(aqi) => {
                let p = (to_x(t), f64::from(aqi));
                current.push(p);
                dots.push((p.0, p.1, Category::from_aqi(aqi).color()));
                y_max = y_max.max(p.1);
            }
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    // Always leave room above the Moderate threshold.
    let y_top = (y_max.max(100.0) * 11.0 / 10.0).ceil();

    TrendSeries {
        segments,
        points: dots,
        thresholds: category_thresholds(),
        x_bounds: [-f64::from(days.max(1)), 0.0],
        y_bounds: [0.0, y_top],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_follow_categories() {
        assert_eq!(
            category_thresholds(),
            vec![(50.0, CategoryColor::Yellow), (100.0, CategoryColor::Red)]
        );
    }

    #[test]
    fn series_splits_on_undefined_points() {
        let end = 10 * 86_400;
        let points = [
            (end - 2 * 86_400, Some(25)),
            (end - 86_400, Some(88)),
            (end - 43_200, None),
            (end, Some(124)),
        ];
        let s = trend_series(&points, end, 3);

        assert_eq!(s.segments, vec![vec![(-2.0, 25.0), (-1.0, 88.0)], vec![(0.0, 124.0)]]);
        assert_eq!(
            s.points.iter().map(|p| p.2).collect::<Vec<_>>(),
            vec![CategoryColor::Green, CategoryColor::Yellow, CategoryColor::Red]
        );
        assert_eq!(s.x_bounds, [-3.0, 0.0]);
        assert_eq!(s.y_bounds, [0.0, 137.0]);
    }

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn chart_renders_into_a_buffer() {
        let end = 10 * 86_400;
        let points = [(end - 2 * 86_400, Some(25)), (end - 86_400, Some(88)), (end, Some(124))];
        let s = trend_series(&points, end, 3);

        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        AqiPlottersChart {
            segments: &s.segments,
            points: &s.points,
            thresholds: &s.thresholds,
            x_bounds: s.x_bounds,
            y_bounds: s.y_bounds,
        }
        .render(area, &mut buf);

        assert!(buffer_text(&buf).chars().any(|c| c != ' '));
    }

    #[test]
    fn tiny_area_shows_a_hint() {
        let s = trend_series(&[(0, Some(25))], 0, 1);
        let area = Rect::new(0, 0, 50, 4);
        let mut buf = Buffer::empty(area);
        AqiPlottersChart {
            segments: &s.segments,
            points: &s.points,
            thresholds: &s.thresholds,
            x_bounds: s.x_bounds,
            y_bounds: s.y_bounds,
        }
        .render(area, &mut buf);

        assert!(buffer_text(&buf).starts_with("Chart area too small (resize terminal)."));
    }

    #[test]
    fn empty_series_keeps_default_bounds() {
        let s = trend_series(&[], 0, 7);
        assert!(s.segments.is_empty());
        assert!(s.points.is_empty());
        assert_eq!(s.x_bounds, [-7.0, 0.0]);
        assert_eq!(s.y_bounds, [0.0, 110.0]);
    }
}
