//! First-week vs latest-week accuracy summary for the whole class.

use serde::Serialize;

use dashboard_core::calculations::Direction;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::formatting::format_percent;

use crate::aggregator::{ClassAggregates, ClassAggregator, WeeklyClassAverage};

const NOT_AVAILABLE: &str = "n/a";

/// Change in one accuracy metric between week 1 and the latest week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracyChange {
    pub first: Option<f64>,
    pub latest: Option<f64>,
    /// `latest - first`; undefined when either end is undefined.
    pub magnitude_change: Option<f64>,
    pub direction: Direction,
}

impl AccuracyChange {
    fn between(first: Option<f64>, latest: Option<f64>) -> Self {
        let magnitude_change = first.zip(latest).map(|(f, l)| l - f);
        Self {
            first,
            latest,
            magnitude_change,
            direction: Direction::from_change(magnitude_change),
        }
    }

    fn sentence(&self, subject: &str) -> String {
        format!(
            "The scholar's accuracy rates on {subject} {} by {} from {} to {}.",
            self.direction,
            percent_or_na(self.magnitude_change),
            percent_or_na(self.first),
            percent_or_na(self.latest),
        )
    }
}

/// Class-wide summary shown above the weekly tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    /// Highest week number present.
    pub week_total: u32,
    pub sciences: AccuracyChange,
    pub cars: AccuracyChange,
}

impl ClassSummary {
    /// Summarise weekly averages sorted by week ascending.
    ///
    /// Fails with [`DashboardError::NoEngagementData`] when `weekly` is empty
    /// and with [`DashboardError::MissingWeek`] when week 1 is absent.
    pub fn from_weekly(weekly: &[WeeklyClassAverage]) -> Result<Self> {
        let week_total = weekly
            .iter()
            .map(|w| w.week)
            .max()
            .ok_or(DashboardError::NoEngagementData)?;

        let first = ClassAggregator::week(weekly, 1).ok_or(DashboardError::MissingWeek(1))?;
        let latest = ClassAggregator::week(weekly, week_total)
            .ok_or(DashboardError::MissingWeek(week_total))?;

        Ok(Self {
            week_total,
            sciences: AccuracyChange::between(first.sciences_accuracy, latest.sciences_accuracy),
            cars: AccuracyChange::between(first.cars_accuracy, latest.cars_accuracy),
        })
    }

    /// Summarise a full set of class aggregates.
    pub fn summarize(aggregates: &ClassAggregates) -> Result<Self> {
        Self::from_weekly(&aggregates.weekly)
    }

    /// Narrative paragraph, one bullet per metric.
    pub fn narrative(&self) -> String {
        format!(
            "Over the course of {} weeks:\n* {}\n* {}",
            self.week_total,
            self.sciences.sentence(
                "their science questions (passage or discrete questions)"
            ),
            self.cars.sentence("their CARS passages"),
        )
    }
}

fn percent_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format_percent(v, 0))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn week(week: u32, sciences: Option<f64>, cars: Option<f64>) -> WeeklyClassAverage {
        WeeklyClassAverage {
            week,
            cars_accuracy: cars,
            sciences_accuracy: sciences,
            class_accuracy: None,
            attendance: None,
            completed_lessons: None,
            completed_question_sets: None,
            time_spent_hrs: None,
            students: 1,
        }
    }

    // ── from_weekly ─────────────────────────────────────────────────────

    #[test]
    fn test_cars_increase_over_ten_weeks() {
        let weekly: Vec<_> = (1..=10)
            .map(|w| {
                let cars = match w {
                    1 => Some(0.50),
                    10 => Some(0.65),
                    _ => Some(0.55),
                };
                week(w, Some(0.70), cars)
            })
            .collect();

        let summary = ClassSummary::from_weekly(&weekly).unwrap();
        assert_eq!(summary.week_total, 10);
        assert!((summary.cars.magnitude_change.unwrap() - 0.15).abs() < 1e-9);
        assert_eq!(summary.cars.direction, Direction::Increased);
    }

    #[test]
    fn test_zero_change_is_decreased() {
        let weekly = vec![week(1, Some(0.7), Some(0.6)), week(2, Some(0.7), Some(0.6))];
        let summary = ClassSummary::from_weekly(&weekly).unwrap();
        assert_eq!(summary.sciences.magnitude_change, Some(0.0));
        assert_eq!(summary.sciences.direction, Direction::Decreased);
        assert_eq!(summary.cars.direction, Direction::Decreased);
    }

    #[test]
    fn test_negative_change_is_decreased() {
        let weekly = vec![week(1, Some(0.8), None), week(3, Some(0.6), None)];
        let summary = ClassSummary::from_weekly(&weekly).unwrap();
        assert!((summary.sciences.magnitude_change.unwrap() + 0.2).abs() < 1e-9);
        assert_eq!(summary.sciences.direction, Direction::Decreased);
    }

    #[test]
    fn test_single_week_compares_with_itself() {
        let weekly = vec![week(1, Some(0.4), Some(0.5))];
        let summary = ClassSummary::from_weekly(&weekly).unwrap();
        assert_eq!(summary.week_total, 1);
        assert_eq!(summary.cars.magnitude_change, Some(0.0));
    }

    #[test]
    fn test_undefined_end_gives_undefined_change() {
        let weekly = vec![week(1, None, Some(0.5)), week(2, Some(0.9), Some(0.6))];
        let summary = ClassSummary::from_weekly(&weekly).unwrap();
        assert_eq!(summary.sciences.magnitude_change, None);
        assert_eq!(summary.sciences.direction, Direction::Decreased);
    }

    #[test]
    fn test_missing_first_week() {
        let weekly = vec![week(2, Some(0.5), Some(0.5)), week(3, Some(0.6), Some(0.6))];
        let err = ClassSummary::from_weekly(&weekly).unwrap_err();
        assert!(matches!(err, DashboardError::MissingWeek(1)));
    }

    #[test]
    fn test_empty_weekly_is_no_data() {
        let err = ClassSummary::from_weekly(&[]).unwrap_err();
        assert!(matches!(err, DashboardError::NoEngagementData));
    }

    // ── narrative ───────────────────────────────────────────────────────

    #[test]
    fn test_narrative_text() {
        let weekly = vec![week(1, Some(0.60), Some(0.50)), week(10, Some(0.72), Some(0.65))];
        let text = ClassSummary::from_weekly(&weekly).unwrap().narrative();

        assert!(text.starts_with("Over the course of 10 weeks:"));
        assert!(text.contains(
            "science questions (passage or discrete questions) increased by 12% from 60% to 72%."
        ));
        assert!(text.contains("CARS passages increased by 15% from 50% to 65%."));
    }

    #[test]
    fn test_narrative_prints_na_for_undefined() {
        let weekly = vec![week(1, None, Some(0.5)), week(2, Some(0.9), Some(0.4))];
        let text = ClassSummary::from_weekly(&weekly).unwrap().narrative();
        assert!(text.contains("decreased by n/a from n/a to 90%."));
        assert!(text.contains("CARS passages decreased by -10% from 50% to 40%."));
    }
}
