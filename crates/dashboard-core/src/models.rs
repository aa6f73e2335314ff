use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

/// One week of engagement and attendance counters for a single student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    /// Opaque student identifier; groups records.
    pub student_id: String,
    /// 1-based week number, unique per student.
    pub week: u32,
    /// First day of the week.
    pub start_date: NaiveDate,
    /// Last day of the week.
    pub end_date: NaiveDate,
    /// Large-group sessions ("workshops") attended this week.
    pub num_attended_large_session: u32,
    /// Large-group sessions scheduled this week.
    pub num_scheduled_large_session: u32,
    /// Small-group sessions ("office hours") attended this week.
    pub num_attended_small_session: u32,
    /// Small-group sessions scheduled this week.
    pub num_scheduled_small_session: u32,
    /// Lessons completed this week.
    pub completed_lessons: u32,
    /// Mandatory lessons completed this week.
    pub completed_mandatory_lessons: u32,
    /// Fraction of mandatory lessons completed, in `[0, 1]`.
    pub percentage_mandatory_complete: Option<f64>,
    /// Completed passage and discrete question sets.
    pub total_completed_passages_discrete_sets: u32,
    /// Accuracy on science questions; `None` when nothing was attempted.
    pub sciences_accuracy: Option<f64>,
    /// Accuracy on CARS passages; `None` when nothing was attempted.
    pub cars_accuracy: Option<f64>,
    /// Accuracy on in-class questions; `None` when nothing was attempted.
    pub class_accuracy: Option<f64>,
    /// Time spent on course content, including self-paced video.
    #[serde(with = "duration_seconds")]
    pub time_spent: TimeDelta,
}

/// One practice-exam result for a single student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScoreRecord {
    pub student_id: String,
    pub test_name: String,
    /// Calendar date of the exam (time-of-day stripped at load).
    pub test_date: NaiveDate,
    pub actual_exam_score: Option<f64>,
    pub low_predicted_exam_score: Option<f64>,
    pub high_predicted_exam_score: Option<f64>,
}

/// Lower and upper bound of the exam score axis.
pub const EXAM_SCORE_DOMAIN: [f64; 2] = [470.0, 528.0];

/// Serialize a [`TimeDelta`] as whole seconds.
mod duration_seconds {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &TimeDelta, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<TimeDelta, D::Error> {
        let secs = i64::deserialize(d)?;
        TimeDelta::try_seconds(secs)
            .ok_or_else(|| serde::de::Error::custom("duration out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> EngagementRecord {
        EngagementRecord {
            student_id: "S1".to_string(),
            week: 1,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
            num_attended_large_session: 1,
            num_scheduled_large_session: 2,
            num_attended_small_session: 0,
            num_scheduled_small_session: 0,
            completed_lessons: 4,
            completed_mandatory_lessons: 3,
            percentage_mandatory_complete: Some(0.25),
            total_completed_passages_discrete_sets: 6,
            sciences_accuracy: Some(0.7),
            cars_accuracy: None,
            class_accuracy: Some(0.65),
            time_spent: TimeDelta::minutes(150),
        }
    }

    #[test]
    fn test_engagement_record_serializes_duration_as_seconds() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["time_spent"], 9_000);
        assert_eq!(json["start_date"], "2024-01-08");
        assert!(json["cars_accuracy"].is_null());
    }

    #[test]
    fn test_engagement_record_json_round_trip_keeps_missing_accuracy() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: EngagementRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_exam_score_domain_bounds() {
        assert!(EXAM_SCORE_DOMAIN[0] < EXAM_SCORE_DOMAIN[1]);
        assert_eq!(EXAM_SCORE_DOMAIN, [470.0, 528.0]);
    }
}
