//! Per-student series: cumulative attendance rates and hours spent.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use dashboard_core::calculations::ratio;
use dashboard_core::models::{EngagementRecord, TestScoreRecord};
use dashboard_core::time_utils::duration_to_hours;

// ── StudentWeek ───────────────────────────────────────────────────────────────

/// Running attended/scheduled totals for one session size.
///
/// Totals are `u64` so that summing any number of `u32` weekly counts
/// cannot overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CumulativeAttendance {
    pub attended: u64,
    pub scheduled: u64,
}

impl CumulativeAttendance {
    fn add(&mut self, attended: u32, scheduled: u32) {
        self.attended += u64::from(attended);
        self.scheduled += u64::from(scheduled);
    }

    /// Cumulative attendance rate, `None` while nothing has been scheduled.
    pub fn rate(&self) -> Option<f64> {
        ratio(self.attended, self.scheduled)
    }
}

/// One week of a student's derived series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentWeek {
    pub week: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub completed_lessons: u32,
    pub completed_mandatory_lessons: u32,
    pub percentage_mandatory_complete: Option<f64>,
    pub completed_question_sets: u32,
    pub sciences_accuracy: Option<f64>,
    pub cars_accuracy: Option<f64>,
    pub class_accuracy: Option<f64>,
    /// Time spent in hours, one decimal.
    pub time_spent_hrs: f64,
    /// Running totals for large-group sessions ("workshops").
    pub large_cumulative: CumulativeAttendance,
    /// Running totals for small-group sessions ("office hours").
    pub small_cumulative: CumulativeAttendance,
    /// Cumulative large-session attendance rate.
    pub large_session: Option<f64>,
    /// Cumulative small-session attendance rate.
    pub small_session: Option<f64>,
}

// ── StudentSeries ─────────────────────────────────────────────────────────────

/// Everything the student page shows for one selected student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSeries {
    pub student_id: String,
    /// Weekly rows in source order.
    pub weeks: Vec<StudentWeek>,
    /// Practice exams in source order.
    pub test_scores: Vec<TestScoreRecord>,
}

impl StudentSeries {
    /// Build the series for `student_id` from the full tables.
    ///
    /// An id with no rows produces an empty series rather than an error.
    pub fn build(
        engagement: &[EngagementRecord],
        test_scores: &[TestScoreRecord],
        student_id: &str,
    ) -> Self {
        let rows: Vec<&EngagementRecord> = engagement
            .iter()
            .filter(|r| r.student_id == student_id)
            .collect();

        if rows.windows(2).any(|pair| pair[0].week >= pair[1].week) {
            warn!(
                "Engagement rows for {} are not in increasing week order; \
                 cumulative totals follow file order",
                student_id
            );
        }

        let weeks = cumulative_weeks(&rows);
        let test_scores: Vec<TestScoreRecord> = test_scores
            .iter()
            .filter(|t| t.student_id == student_id)
            .cloned()
            .collect();

        debug!(
            "Built series for {}: {} weeks, {} practice exams",
            student_id,
            weeks.len(),
            test_scores.len()
        );

        Self {
            student_id: student_id.to_string(),
            weeks,
            test_scores,
        }
    }

    /// `true` when the student has neither engagement rows nor exams.
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty() && self.test_scores.is_empty()
    }

    /// Distinct exam dates in ascending order, used as the exam chart's
    /// x-axis categories.
    pub fn exam_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.test_scores.iter().map(|t| t.test_date).collect();
        dates.sort();
        dates.dedup();
        dates
    }
}

/// Distinct student ids in first-seen order.
pub fn distinct_student_ids(engagement: &[EngagementRecord]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    engagement
        .iter()
        .filter(|r| seen.insert(r.student_id.as_str()))
        .map(|r| r.student_id.clone())
        .collect()
}

/// Running sums start at zero before the first row and accumulate in the
/// order given.
fn cumulative_weeks(rows: &[&EngagementRecord]) -> Vec<StudentWeek> {
    let mut large = CumulativeAttendance::default();
    let mut small = CumulativeAttendance::default();

    rows.iter()
        .map(|r| {
            large.add(r.num_attended_large_session, r.num_scheduled_large_session);
            small.add(r.num_attended_small_session, r.num_scheduled_small_session);

            StudentWeek {
                week: r.week,
                start_date: r.start_date,
                end_date: r.end_date,
                completed_lessons: r.completed_lessons,
                completed_mandatory_lessons: r.completed_mandatory_lessons,
                percentage_mandatory_complete: r.percentage_mandatory_complete,
                completed_question_sets: r.total_completed_passages_discrete_sets,
                sciences_accuracy: r.sciences_accuracy,
                cars_accuracy: r.cars_accuracy,
                class_accuracy: r.class_accuracy,
                time_spent_hrs: duration_to_hours(r.time_spent),
                large_cumulative: large,
                small_cumulative: small,
                large_session: large.rate(),
                small_session: small.rate(),
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
