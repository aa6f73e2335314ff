//! Line and point charts for the student page.
//!
//! Each chart is described by a [`ChartSpec`] holding owned point data, so
//! the ratatui datasets can borrow from it for the duration of one frame.

use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use dashboard_core::formatting::{format_number, format_percent};

use crate::themes::Theme;

// ── Types ─────────────────────────────────────────────────────────────────────

/// How the y-axis tick labels are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// Fractions shown as whole percentages.
    Percent,
    /// Plain numbers with one decimal place.
    Number,
    /// Whole numbers.
    Integer,
}

impl ValueFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            ValueFormat::Percent => format_percent(value, 0),
            ValueFormat::Number => format_number(value, 1),
            ValueFormat::Integer => format_number(value, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Connected line with a marker at every point.
    Line,
    /// Unconnected markers only.
    Points,
}

/// One named series of `(x, y)` points.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

impl ChartSeries {
    pub fn new(name: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Build a series from optional y-values, dropping the undefined ones.
    pub fn from_optional<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (f64, Option<f64>)>,
    {
        let points = values
            .into_iter()
            .filter_map(|(x, y)| y.filter(|v| v.is_finite()).map(|v| (x, v)))
            .collect();
        Self::new(name, points)
    }
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub kind: ChartKind,
    pub y_format: ValueFormat,
    pub x_bounds: [f64; 2],
    pub x_labels: Vec<String>,
    pub y_bounds: [f64; 2],
    pub series: Vec<ChartSeries>,
}

impl ChartSpec {
    /// Line chart with weeks on the x axis and y bounds fitted to the data.
    pub fn weekly(
        title: &str,
        y_title: &str,
        y_format: ValueFormat,
        series: Vec<ChartSeries>,
    ) -> Self {
        let x_bounds = fit_bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)), 0.0);
        let y_pad = if y_format == ValueFormat::Percent { 0.05 } else { 0.5 };
        let y_bounds = fit_bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)), y_pad);

        Self {
            title: title.to_string(),
            x_title: "Week".to_string(),
            y_title: y_title.to_string(),
            kind: ChartKind::Line,
            y_format,
            x_labels: edge_labels(x_bounds, ValueFormat::Integer),
            x_bounds,
            y_bounds,
            series,
        }
    }

    pub fn has_points(&self) -> bool {
        self.series.iter().any(|s| !s.points.is_empty())
    }

    fn y_labels(&self) -> Vec<String> {
        let [lo, hi] = self.y_bounds;
        [lo, (lo + hi) / 2.0, hi]
            .into_iter()
            .map(|v| self.y_format.format(v))
            .collect()
    }
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// `[min - pad, max + pad]` over `values`; `[0, 1]` when there are none.
/// A single distinct value is widened by half a unit either side so the
/// point is not drawn on the frame.
pub fn fit_bounds<I: IntoIterator<Item = f64>>(values: I, pad: f64) -> [f64; 2] {
    let mut iter = values.into_iter().filter(|v| v.is_finite());
    let Some(first) = iter.next() else {
        return [0.0, 1.0];
    };
    let (lo, hi) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo == hi {
        let half = if pad > 0.0 { pad } else { 0.5 };
        [lo - half, hi + half]
    } else {
        [lo - pad, hi + pad]
    }
}

fn edge_labels(bounds: [f64; 2], format: ValueFormat) -> Vec<String> {
    let [lo, hi] = bounds;
    vec![format.format(lo.ceil()), format.format(hi.floor())]
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render `spec` into `area`. Charts without any defined point show a
/// placeholder instead of empty axes.
pub fn render_chart(frame: &mut Frame, area: Rect, spec: &ChartSpec, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(Span::styled(format!(" {} ", spec.title), theme.bold));

    if !spec.has_points() {
        let placeholder = Paragraph::new(Line::from(Span::styled("No data", theme.dim)))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let mut datasets = Vec::with_capacity(spec.series.len() * 2);
    for (idx, series) in spec.series.iter().enumerate() {
        let style = Style::default().fg(theme.series_color(idx));
        match spec.kind {
            ChartKind::Line => {
                datasets.push(
                    Dataset::default()
                        .name(series.name.clone())
                        .marker(Marker::Braille)
                        .graph_type(GraphType::Line)
                        .style(style)
                        .data(&series.points),
                );
                // Unnamed overlay so single-point series stay visible.
                datasets.push(
                    Dataset::default()
                        .marker(Marker::Dot)
                        .graph_type(GraphType::Scatter)
                        .style(style)
                        .data(&series.points),
                );
            }
            ChartKind::Points => {
                datasets.push(
                    Dataset::default()
                        .name(series.name.clone())
                        .marker(Marker::Dot)
                        .graph_type(GraphType::Scatter)
                        .style(style)
                        .data(&series.points),
                );
            }
        }
    }

    let chart = Chart::new(datasets)
        .block(block)
        .style(theme.text)
        .x_axis(
            Axis::default()
                .title(Span::styled(spec.x_title.clone(), theme.label))
                .style(theme.axis)
                .bounds(spec.x_bounds)
                .labels(spec.x_labels.clone()),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(spec.y_title.clone(), theme.label))
                .style(theme.axis)
                .bounds(spec.y_bounds)
                .labels(spec.y_labels()),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));

    frame.render_widget(chart, area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    // ── ChartSeries ───────────────────────────────────────────────────────────

    #[test]
    fn test_from_optional_drops_undefined() {
        let s = ChartSeries::from_optional(
            "Sciences",
            vec![(1.0, Some(0.5)), (2.0, None), (3.0, Some(f64::NAN)), (4.0, Some(0.7))],
        );
        assert_eq!(s.points, vec![(1.0, 0.5), (4.0, 0.7)]);
    }

    // ── fit_bounds ────────────────────────────────────────────────────────────

    #[test]
    fn test_fit_bounds_empty() {
        assert_eq!(fit_bounds(Vec::<f64>::new(), 0.5), [0.0, 1.0]);
    }

    #[test]
    fn test_fit_bounds_padded() {
        assert_eq!(fit_bounds(vec![2.0, 8.0, 5.0], 0.5), [1.5, 8.5]);
    }

    #[test]
    fn test_fit_bounds_single_value_widened() {
        assert_eq!(fit_bounds(vec![3.0], 0.0), [2.5, 3.5]);
        assert_eq!(fit_bounds(vec![0.5, 0.5], 0.25), [0.25, 0.75]);
    }

    // ── ChartSpec ─────────────────────────────────────────────────────────────

    #[test]
    fn test_weekly_spec_axes() {
        let spec = ChartSpec::weekly(
            "Completed Lessons",
            "Completed Count",
            ValueFormat::Number,
            vec![ChartSeries::new("Lessons", vec![(1.0, 3.0), (4.0, 9.0)])],
        );
        assert_eq!(spec.x_bounds, [1.0, 4.0]);
        assert_eq!(spec.x_labels, vec!["1", "4"]);
        assert_eq!(spec.y_bounds, [2.5, 9.5]);
        assert_eq!(spec.y_labels(), vec!["2.5", "6.0", "9.5"]);
    }

    #[test]
    fn test_percent_labels() {
        let spec = ChartSpec::weekly(
            "Accuracy",
            "Accuracy Score",
            ValueFormat::Percent,
            vec![ChartSeries::new("Class", vec![(1.0, 0.25), (2.0, 0.75)])],
        );
        assert_eq!(spec.y_labels(), vec!["20%", "50%", "80%"]);
    }

    // ── Render (does not panic) ───────────────────────────────────────────────

    #[test]
    fn test_render_line_chart_does_not_panic() {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let spec = ChartSpec::weekly(
            "Attendance",
            "Cumulative Attendance Rate",
            ValueFormat::Percent,
            vec![
                ChartSeries::new("Workshop", vec![(1.0, 0.5), (2.0, 0.75)]),
                ChartSeries::new("Office Hours", vec![(2.0, 1.0)]),
            ],
        );

        terminal
            .draw(|frame| render_chart(frame, frame.area(), &spec, &theme))
            .unwrap();
    }

    #[test]
    fn test_render_empty_chart_shows_placeholder() {
        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let spec = ChartSpec::weekly("Empty", "y", ValueFormat::Number, vec![]);

        terminal
            .draw(|frame| render_chart(frame, frame.area(), &spec, &theme))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("No data"));
    }
}
