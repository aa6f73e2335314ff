//! Weekly class averages across all students.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use dashboard_core::calculations::{mean_defined, min_max_defined, ratio};
use dashboard_core::models::EngagementRecord;
use dashboard_core::time_utils::duration_to_hours;

// ── WeeklyClassAverage ────────────────────────────────────────────────────────

/// Class means for one week. Each field skips students with no value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyClassAverage {
    pub week: u32,
    pub cars_accuracy: Option<f64>,
    pub sciences_accuracy: Option<f64>,
    pub class_accuracy: Option<f64>,
    /// Mean single-week workshop attendance rate.
    pub attendance: Option<f64>,
    pub completed_lessons: Option<f64>,
    pub completed_question_sets: Option<f64>,
    pub time_spent_hrs: Option<f64>,
    /// Number of engagement rows that fell in this week.
    pub students: usize,
}

/// Smallest and largest weekly mean of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

/// Weekly averages plus the ranges shown under the class tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassAggregates {
    /// Sorted by week ascending.
    pub weekly: Vec<WeeklyClassAverage>,
    pub class_accuracy_range: Option<MetricRange>,
    pub attendance_range: Option<MetricRange>,
}

impl ClassAggregates {
    /// Aggregate every engagement row in the table.
    pub fn from_records(engagement: &[EngagementRecord]) -> Self {
        let weekly = ClassAggregator::weekly_averages(engagement);
        let class_accuracy_range = ClassAggregator::range(&weekly, |w| w.class_accuracy);
        let attendance_range = ClassAggregator::range(&weekly, |w| w.attendance);
        debug!(weeks = weekly.len(), "aggregated class data");
        Self {
            weekly,
            class_accuracy_range,
            attendance_range,
        }
    }

    /// Weekly rows latest first, the order the class tables use.
    pub fn weeks_descending(&self) -> impl Iterator<Item = &WeeklyClassAverage> {
        self.weekly.iter().rev()
    }

    pub fn is_empty(&self) -> bool {
        self.weekly.is_empty()
    }
}

// ── Row accumulator ───────────────────────────────────────────────────────────

#[derive(Default)]
struct WeekBucket {
    cars_accuracy: Vec<Option<f64>>,
    sciences_accuracy: Vec<Option<f64>>,
    class_accuracy: Vec<Option<f64>>,
    attendance: Vec<Option<f64>>,
    completed_lessons: Vec<Option<f64>>,
    completed_question_sets: Vec<Option<f64>>,
    time_spent_hrs: Vec<Option<f64>>,
}

impl WeekBucket {
    fn add_record(&mut self, r: &EngagementRecord) {
        self.cars_accuracy.push(r.cars_accuracy);
        self.sciences_accuracy.push(r.sciences_accuracy);
        self.class_accuracy.push(r.class_accuracy);
        self.attendance.push(ratio(
            u64::from(r.num_attended_large_session),
            u64::from(r.num_scheduled_large_session),
        ));
        self.completed_lessons.push(Some(f64::from(r.completed_lessons)));
        self.completed_question_sets
            .push(Some(f64::from(r.total_completed_passages_discrete_sets)));
        self.time_spent_hrs.push(Some(duration_to_hours(r.time_spent)));
    }

    fn into_average(self, week: u32) -> WeeklyClassAverage {
        WeeklyClassAverage {
            week,
            students: self.attendance.len(),
            cars_accuracy: mean_defined(self.cars_accuracy),
            sciences_accuracy: mean_defined(self.sciences_accuracy),
            class_accuracy: mean_defined(self.class_accuracy),
            attendance: mean_defined(self.attendance),
            completed_lessons: mean_defined(self.completed_lessons),
            completed_question_sets: mean_defined(self.completed_question_sets),
            time_spent_hrs: mean_defined(self.time_spent_hrs),
        }
    }
}

// ── ClassAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that groups engagement rows by week.
pub struct ClassAggregator;

impl ClassAggregator {
    /// Group every student's rows by `week` and average each metric.
    ///
    /// Returns one entry per week present, sorted by week ascending.
    pub fn weekly_averages(engagement: &[EngagementRecord]) -> Vec<WeeklyClassAverage> {
        let mut map: BTreeMap<u32, WeekBucket> = BTreeMap::new();

        for record in engagement {
            map.entry(record.week).or_default().add_record(record);
        }

        map.into_iter()
            .map(|(week, bucket)| bucket.into_average(week))
            .collect()
    }

    /// Min/max of the weekly means selected by `metric`, skipping undefined
    /// weeks.
    pub fn range(
        weekly: &[WeeklyClassAverage],
        metric: impl Fn(&WeeklyClassAverage) -> Option<f64>,
    ) -> Option<MetricRange> {
        min_max_defined(weekly.iter().map(metric)).map(|(min, max)| MetricRange { min, max })
    }

    /// Find the aggregated row for `week`.
    pub fn week(weekly: &[WeeklyClassAverage], week: u32) -> Option<&WeeklyClassAverage> {
        weekly
            .binary_search_by_key(&week, |w| w.week)
            .ok()
            .map(|idx| &weekly[idx])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    fn make_row(student: &str, week: u32) -> EngagementRecord {
        EngagementRecord {
            student_id: student.to_string(),
            week,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            num_attended_large_session: 1,
            num_scheduled_large_session: 2,
            num_attended_small_session: 0,
            num_scheduled_small_session: 0,
            completed_lessons: 4,
            completed_mandatory_lessons: 2,
            percentage_mandatory_complete: Some(0.5),
            total_completed_passages_discrete_sets: 6,
            sciences_accuracy: Some(0.8),
            cars_accuracy: Some(0.5),
            class_accuracy: Some(0.7),
            time_spent: TimeDelta::hours(2),
        }
    }

    #[test]
    fn test_weekly_mean_of_two_students() {
        let mut a = make_row("S1", 1);
        let mut b = make_row("S2", 1);
        a.sciences_accuracy = Some(0.80);
        b.sciences_accuracy = Some(0.60);

        let weekly = ClassAggregator::weekly_averages(&[a, b]);
        assert_eq!(weekly.len(), 1);
        assert!((weekly[0].sciences_accuracy.unwrap() - 0.70).abs() < 1e-12);
        assert_eq!(weekly[0].students, 2);
    }

    #[test]
    fn test_weekly_mean_skips_undefined() {
        let mut a = make_row("S1", 1);
        let mut b = make_row("S2", 1);
        a.sciences_accuracy = Some(0.80);
        b.sciences_accuracy = None;

        let weekly = ClassAggregator::weekly_averages(&[a, b]);
        assert_eq!(weekly[0].sciences_accuracy, Some(0.80));
    }

    #[test]
    fn test_weekly_mean_three_of_five_defined() {
        let values = [Some(0.9), None, Some(0.6), None, Some(0.6)];
        let rows: Vec<EngagementRecord> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut r = make_row(&format!("S{i}"), 3);
                r.sciences_accuracy = *v;
                r
            })
            .collect();

        let weekly = ClassAggregator::weekly_averages(&rows);
        assert!((weekly[0].sciences_accuracy.unwrap() - 0.7).abs() < 1e-12);
        assert_eq!(weekly[0].students, 5);
    }

    #[test]
    fn test_weekly_all_undefined_is_none() {
        let mut a = make_row("S1", 2);
        a.cars_accuracy = None;
        let weekly = ClassAggregator::weekly_averages(&[a]);
        assert_eq!(weekly[0].cars_accuracy, None);
    }

    #[test]
    fn test_attendance_is_single_week_ratio() {
        let mut a = make_row("S1", 1);
        let mut b = make_row("S2", 1);
        (a.num_attended_large_session, a.num_scheduled_large_session) = (1, 1);
        (b.num_attended_large_session, b.num_scheduled_large_session) = (1, 4);

        let weekly = ClassAggregator::weekly_averages(&[a, b]);
        assert!((weekly[0].attendance.unwrap() - 0.625).abs() < 1e-12);
    }

    #[test]
    fn test_attendance_skips_unscheduled_rows() {
        let mut a = make_row("S1", 1);
        let mut b = make_row("S2", 1);
        (a.num_attended_large_session, a.num_scheduled_large_session) = (0, 0);
        (b.num_attended_large_session, b.num_scheduled_large_session) = (1, 2);

        let weekly = ClassAggregator::weekly_averages(&[a, b]);
        assert_eq!(weekly[0].attendance, Some(0.5));
    }

    #[test]
    fn test_engagement_means() {
        let mut a = make_row("S1", 1);
        let mut b = make_row("S2", 1);
        a.completed_lessons = 3;
        b.completed_lessons = 6;
        a.total_completed_passages_discrete_sets = 1;
        b.total_completed_passages_discrete_sets = 2;
        a.time_spent = TimeDelta::minutes(90);
        b.time_spent = TimeDelta::minutes(30);

        let weekly = ClassAggregator::weekly_averages(&[a, b]);
        assert_eq!(weekly[0].completed_lessons, Some(4.5));
        assert_eq!(weekly[0].completed_question_sets, Some(1.5));
        assert!((weekly[0].time_spent_hrs.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weeks_sorted_ascending() {
        let rows = vec![make_row("S1", 3), make_row("S1", 1), make_row("S2", 2)];
        let weekly = ClassAggregator::weekly_averages(&rows);
        let weeks: Vec<u32> = weekly.iter().map(|w| w.week).collect();
        assert_eq!(weeks, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_input() {
        assert!(ClassAggregator::weekly_averages(&[]).is_empty());
    }

    #[test]
    fn test_range_over_weeks() {
        let mut w1 = make_row("S1", 1);
        let mut w2 = make_row("S1", 2);
        let mut w3 = make_row("S1", 3);
        w1.class_accuracy = Some(0.55);
        w2.class_accuracy = None;
        w3.class_accuracy = Some(0.72);

        let weekly = ClassAggregator::weekly_averages(&[w1, w2, w3]);
        let range = ClassAggregator::range(&weekly, |w| w.class_accuracy).unwrap();
        assert_eq!(range, MetricRange { min: 0.55, max: 0.72 });
    }

    #[test]
    fn test_class_aggregates_bundle() {
        let mut w1 = make_row("S1", 1);
        let mut w2 = make_row("S1", 2);
        (w1.num_attended_large_session, w1.num_scheduled_large_session) = (2, 2);
        (w2.num_attended_large_session, w2.num_scheduled_large_session) = (1, 4);

        let agg = ClassAggregates::from_records(&[w1, w2]);
        assert_eq!(
            agg.attendance_range,
            Some(MetricRange { min: 0.25, max: 1.0 })
        );
        assert_eq!(
            agg.class_accuracy_range,
            Some(MetricRange { min: 0.7, max: 0.7 })
        );
        let order: Vec<u32> = agg.weeks_descending().map(|w| w.week).collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn test_class_aggregates_empty() {
        let agg = ClassAggregates::from_records(&[]);
        assert!(agg.is_empty());
        assert!(agg.attendance_range.is_none());
    }

    #[test]
    fn test_week_lookup() {
        let weekly = ClassAggregator::weekly_averages(&[make_row("S1", 1), make_row("S1", 4)]);
        assert_eq!(ClassAggregator::week(&weekly, 4).map(|w| w.week), Some(4));
        assert!(ClassAggregator::week(&weekly, 2).is_none());
    }
}
