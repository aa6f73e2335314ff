//! Class page: narrative summary and the weekly class-average tables.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use dashboard_core::error::Result;
use dashboard_core::formatting::{format_optional_number, format_optional_percent, format_percent};
use dashboard_runtime::data::aggregator::{ClassAggregates, MetricRange};
use dashboard_runtime::data::summary::ClassSummary;

use crate::table_view::{self, TableData};
use crate::themes::Theme;

// ── Table builders ────────────────────────────────────────────────────────────

/// Weekly accuracy means, latest week first.
pub fn accuracy_table(class: &ClassAggregates) -> TableData {
    let mut table = TableData::new(&[("Week", 6), ("CARS", 9), ("Sciences", 10), ("Class", 9)]);
    for w in class.weeks_descending() {
        table.push_row(vec![
            w.week.to_string(),
            format_optional_percent(w.cars_accuracy, 1),
            format_optional_percent(w.sciences_accuracy, 1),
            format_optional_percent(w.class_accuracy, 1),
        ]);
    }
    table
}

/// Weekly workshop attendance means, latest week first.
pub fn attendance_table(class: &ClassAggregates) -> TableData {
    let mut table = TableData::new(&[("Week", 6), ("Attendance", 12)]);
    for w in class.weeks_descending() {
        table.push_row(vec![
            w.week.to_string(),
            format_optional_percent(w.attendance, 1),
        ]);
    }
    table
}

/// Weekly engagement means, latest week first.
pub fn engagement_table(class: &ClassAggregates) -> TableData {
    let mut table = TableData::new(&[
        ("Week", 6),
        ("Lessons", 9),
        ("Question Sets", 15),
        ("Hours", 8),
    ]);
    for w in class.weeks_descending() {
        table.push_row(vec![
            w.week.to_string(),
            format_optional_number(w.completed_lessons, 1),
            format_optional_number(w.completed_question_sets, 1),
            format_optional_number(w.time_spent_hrs, 1),
        ]);
    }
    table
}

/// `"label: 55.0% to 72.0%"`, or `None` when every week is undefined.
pub fn range_text(label: &str, range: Option<MetricRange>) -> Option<String> {
    range.map(|r| {
        format!(
            "{label}: {} to {}",
            format_percent(r.min, 1),
            format_percent(r.max, 1)
        )
    })
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn summary_lines<'a>(summary: &Result<ClassSummary>, theme: &Theme) -> Vec<Line<'a>> {
    match summary {
        Ok(s) => {
            let mut lines: Vec<Line> = s
                .narrative()
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), theme.text)))
                .collect();
            lines.push(Line::from(vec![
                Span::styled("Sciences ", theme.label),
                Span::styled(s.sciences.direction.to_string(), theme.direction_style(s.sciences.direction)),
                Span::styled("   CARS ", theme.label),
                Span::styled(s.cars.direction.to_string(), theme.direction_style(s.cars.direction)),
            ]));
            lines
        }
        Err(e) => vec![Line::from(Span::styled(e.to_string(), theme.error))],
    }
}

/// Render the whole class page into `area`.
pub fn render_class_view(
    frame: &mut Frame,
    area: Rect,
    class: &ClassAggregates,
    summary: &Result<ClassSummary>,
    theme: &Theme,
) {
    if class.is_empty() {
        table_view::render_no_data(frame, area, "Class", "The engagement table has no rows.", theme);
        return;
    }

    let [top, tables, footer] = Layout::vertical([
        Constraint::Length(7),
        Constraint::Min(6),
        Constraint::Length(1),
    ])
    .areas(area);

    let narrative = Paragraph::new(Text::from(summary_lines(summary, theme)))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(Span::styled(" Summary ", theme.bold)),
        );
    frame.render_widget(narrative, top);

    let [acc, att, eng] = Layout::horizontal([
        Constraint::Length(38),
        Constraint::Length(22),
        Constraint::Min(40),
    ])
    .areas(tables);
    table_view::render_table_view(frame, acc, "Accuracy", &accuracy_table(class), theme);
    table_view::render_table_view(frame, att, "Attendance", &attendance_table(class), theme);
    table_view::render_table_view(frame, eng, "Engagement", &engagement_table(class), theme);

    let ranges: Vec<String> = [
        range_text("Class accuracy", class.class_accuracy_range),
        range_text("Attendance", class.attendance_range),
    ]
    .into_iter()
    .flatten()
    .collect();
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(ranges.join("   "), theme.dim))),
        footer,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
