//! Student page: engagement and performance charts plus practice exams.
//!
//! Layout (top to bottom):
//! 1. three rows of two weekly charts each,
//! 2. the practice-exam table beside the exam-score point chart.

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

use dashboard_core::formatting::format_optional_number;
use dashboard_core::models::{TestScoreRecord, EXAM_SCORE_DOMAIN};
use dashboard_runtime::data::student::{StudentSeries, StudentWeek};

use crate::components::chart::{render_chart, ChartKind, ChartSeries, ChartSpec, ValueFormat};
use crate::table_view::{self, TableData};
use crate::themes::Theme;

/// Exam dates beyond this count are labelled first and last only.
const MAX_DATE_LABELS: usize = 6;

// ── Chart builders ────────────────────────────────────────────────────────────

fn weekly_series<F>(name: &str, weeks: &[StudentWeek], value: F) -> ChartSeries
where
    F: Fn(&StudentWeek) -> Option<f64>,
{
    ChartSeries::from_optional(name, weeks.iter().map(|w| (f64::from(w.week), value(w))))
}

/// The six weekly charts, in display order.
pub fn weekly_charts(series: &StudentSeries) -> Vec<ChartSpec> {
    let weeks = &series.weeks;
    vec![
        ChartSpec::weekly(
            "Completed Lessons",
            "Completed Count",
            ValueFormat::Integer,
            vec![
                weekly_series("Lessons", weeks, |w| Some(f64::from(w.completed_lessons))),
                weekly_series("Mandatory Lessons", weeks, |w| {
                    Some(f64::from(w.completed_mandatory_lessons))
                }),
            ],
        ),
        ChartSpec::weekly(
            "Percentage of Mandatory Lessons Completed",
            "% Mandatory Lessons Completed",
            ValueFormat::Percent,
            vec![weekly_series("Mandatory Complete", weeks, |w| {
                w.percentage_mandatory_complete
            })],
        ),
        ChartSpec::weekly(
            "Completed Question Sets",
            "Completed Count",
            ValueFormat::Integer,
            vec![weekly_series("Question Sets", weeks, |w| {
                Some(f64::from(w.completed_question_sets))
            })],
        ),
        ChartSpec::weekly(
            "Time Spent (Hrs)",
            "Time Spent (Hrs)",
            ValueFormat::Number,
            vec![weekly_series("Hours", weeks, |w| Some(w.time_spent_hrs))],
        ),
        ChartSpec::weekly(
            "Attendance",
            "Cumulative Attendance Rate",
            ValueFormat::Percent,
            vec![
                weekly_series("Workshop", weeks, |w| w.large_session),
                weekly_series("Office Hours", weeks, |w| w.small_session),
            ],
        ),
        ChartSpec::weekly(
            "Accuracy",
            "Accuracy Score",
            ValueFormat::Percent,
            vec![
                weekly_series("Sciences", weeks, |w| w.sciences_accuracy),
                weekly_series("CARS", weeks, |w| w.cars_accuracy),
                weekly_series("Class", weeks, |w| w.class_accuracy),
            ],
        ),
    ]
}

/// Point chart of exam scores. The x axis is the position of each test date
/// among the student's distinct dates; the y axis is fixed to the score domain.
pub fn exam_chart(series: &StudentSeries) -> ChartSpec {
    let dates = series.exam_dates();
    let position = |date: NaiveDate| dates.iter().position(|d| *d == date).unwrap_or(0) as f64;

    let score_series = |name: &str, score: fn(&TestScoreRecord) -> Option<f64>| {
        ChartSeries::from_optional(
            name,
            series
                .test_scores
                .iter()
                .map(|t| (position(t.test_date), score(t))),
        )
    };

    let (x_bounds, x_labels) = date_axis(&dates);

    ChartSpec {
        title: "Exam Scores".to_string(),
        x_title: "Test Date".to_string(),
        y_title: "Exam Score".to_string(),
        kind: ChartKind::Points,
        y_format: ValueFormat::Integer,
        x_bounds,
        x_labels,
        y_bounds: EXAM_SCORE_DOMAIN,
        series: vec![
            score_series("Actual", |t: &TestScoreRecord| t.actual_exam_score),
            score_series("Low Predicted", |t: &TestScoreRecord| t.low_predicted_exam_score),
            score_series("High Predicted", |t: &TestScoreRecord| t.high_predicted_exam_score),
        ],
    }
}

fn date_axis(dates: &[NaiveDate]) -> ([f64; 2], Vec<String>) {
    let fmt = |d: &NaiveDate| d.format("%Y-%m-%d").to_string();
    match dates {
        [] => ([0.0, 1.0], Vec::new()),
        [only] => ([-1.0, 1.0], vec![String::new(), fmt(only), String::new()]),
        [first, .., last] if dates.len() > MAX_DATE_LABELS => {
            ([0.0, (dates.len() - 1) as f64], vec![fmt(first), fmt(last)])
        }
        _ => ([0.0, (dates.len() - 1) as f64], dates.iter().map(fmt).collect()),
    }
}

/// Practice-exam table rows in source order.
pub fn exam_table(series: &StudentSeries) -> TableData {
    let mut table = TableData::new(&[
        ("Test", 14),
        ("Date", 12),
        ("Actual", 8),
        ("Low", 8),
        ("High", 8),
    ]);
    for t in &series.test_scores {
        table.push_row(vec![
            t.test_name.clone(),
            t.test_date.format("%Y-%m-%d").to_string(),
            format_optional_number(t.actual_exam_score, 0),
            format_optional_number(t.low_predicted_exam_score, 0),
            format_optional_number(t.high_predicted_exam_score, 0),
        ]);
    }
    table
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render the whole student page into `area`.
pub fn render_student_view(frame: &mut Frame, area: Rect, series: &StudentSeries, theme: &Theme) {
    if series.is_empty() {
        table_view::render_no_data(
            frame,
            area,
            "Student",
            &format!("No engagement or exam rows for {}.", series.student_id),
            theme,
        );
        return;
    }

    let rows = Layout::vertical([
        Constraint::Ratio(1, 4),
        Constraint::Ratio(1, 4),
        Constraint::Ratio(1, 4),
        Constraint::Ratio(1, 4),
    ])
    .split(area);

    let charts = weekly_charts(series);
    for (row_idx, pair) in charts.chunks(2).enumerate() {
        let cols = Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .split(rows[row_idx]);
        for (col_idx, spec) in pair.iter().enumerate() {
            render_chart(frame, cols[col_idx], spec, theme);
        }
    }

    let bottom = Layout::horizontal([Constraint::Length(56), Constraint::Min(20)]).split(rows[3]);
    let exams = exam_table(series);
    if exams.is_empty() {
        table_view::render_no_data(frame, bottom[0], "Practice Exams", "No practice exams yet.", theme);
    } else {
        table_view::render_table_view(frame, bottom[0], "Practice Exams", &exams, theme);
    }
    render_chart(frame, bottom[1], &exam_chart(series), theme);
}

// ── Tests ──────────────────────────────────────────────────────────────────────
