//! CSV loading for the engagement and practice-exam tables.
//!
//! Both tables carry a header row. Rows are decoded with `serde` into raw
//! string-typed structs, then validated into the typed records from
//! [`dashboard_core::models`]. Any malformed date or duration aborts the load;
//! there is no partial recovery.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{EngagementRecord, TestScoreRecord};
use dashboard_core::time_utils::{parse_calendar_date, parse_duration};

// ── Raw rows ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct EngagementRow {
    student_id: String,
    week: u32,
    start_date: String,
    end_date: String,
    #[serde(deserialize_with = "count")]
    num_attended_large_session: u32,
    #[serde(deserialize_with = "count")]
    num_scheduled_large_session: u32,
    #[serde(deserialize_with = "count")]
    num_attended_small_session: u32,
    #[serde(deserialize_with = "count")]
    num_scheduled_small_session: u32,
    #[serde(deserialize_with = "count")]
    completed_lessons: u32,
    #[serde(deserialize_with = "count")]
    completed_mandatory_lessons: u32,
    percentage_mandatory_complete: Option<f64>,
    #[serde(deserialize_with = "count")]
    total_completed_passages_discrete_sets: u32,
    sciences_accuracy: Option<f64>,
    cars_accuracy: Option<f64>,
    class_accuracy: Option<f64>,
    time_spent: String,
}

#[derive(Debug, Deserialize)]
struct TestScoreRow {
    student_id: String,
    test_name: String,
    test_date: String,
    actual_exam_score: Option<f64>,
    low_predicted_exam_score: Option<f64>,
    high_predicted_exam_score: Option<f64>,
}

/// Accept counters written either as integers or as integral floats
/// (`"3"` or `"3.0"`).
fn count<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u32, D::Error> {
    let raw = String::deserialize(d)?;
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<u32>() {
        return Ok(n);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&f) => Ok(f as u32),
        _ => Err(serde::de::Error::custom(format!(
            "expected a non-negative whole number, found {:?}",
            raw
        ))),
    }
}

/// `NaN` cells mean "no observation", same as an empty cell.
fn defined(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

fn date_cell(origin: &Path, column: &'static str, line: u64, value: &str) -> Result<NaiveDate> {
    parse_calendar_date(value).ok_or_else(|| DashboardError::DateParse {
        path: origin.to_path_buf(),
        column,
        line,
        value: value.to_string(),
    })
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the weekly engagement/attendance table from `path`.
pub fn load_engagement(path: &Path) -> Result<Vec<EngagementRecord>> {
    let file = open(path)?;
    let records = read_engagement(file, path)?;
    debug!(
        "Loaded {} engagement rows from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Load the practice-exam table from `path`.
pub fn load_test_scores(path: &Path) -> Result<Vec<TestScoreRecord>> {
    let file = open(path)?;
    let records = read_test_scores(file, path)?;
    debug!(
        "Loaded {} test score rows from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Decode engagement rows from any reader. `origin` is only used in errors.
pub fn read_engagement<R: Read>(input: R, origin: &Path) -> Result<Vec<EngagementRecord>> {
    let mut records = Vec::new();
    for_each_row(input, origin, |row: EngagementRow, line| {
        let time_spent =
            parse_duration(&row.time_spent).ok_or_else(|| DashboardError::DurationParse {
                path: origin.to_path_buf(),
                line,
                value: row.time_spent.clone(),
            })?;

        records.push(EngagementRecord {
            start_date: date_cell(origin, "start_date", line, &row.start_date)?,
            end_date: date_cell(origin, "end_date", line, &row.end_date)?,
            student_id: row.student_id,
            week: row.week,
            num_attended_large_session: row.num_attended_large_session,
            num_scheduled_large_session: row.num_scheduled_large_session,
            num_attended_small_session: row.num_attended_small_session,
            num_scheduled_small_session: row.num_scheduled_small_session,
            completed_lessons: row.completed_lessons,
            completed_mandatory_lessons: row.completed_mandatory_lessons,
            percentage_mandatory_complete: defined(row.percentage_mandatory_complete),
            total_completed_passages_discrete_sets: row.total_completed_passages_discrete_sets,
            sciences_accuracy: defined(row.sciences_accuracy),
            cars_accuracy: defined(row.cars_accuracy),
            class_accuracy: defined(row.class_accuracy),
            time_spent,
        });
        Ok(())
    })?;
    Ok(records)
}

/// Decode practice-exam rows from any reader. `origin` is only used in errors.
pub fn read_test_scores<R: Read>(input: R, origin: &Path) -> Result<Vec<TestScoreRecord>> {
    let mut records = Vec::new();
    for_each_row(input, origin, |row: TestScoreRow, line| {
        records.push(TestScoreRecord {
            test_date: date_cell(origin, "test_date", line, &row.test_date)?,
            student_id: row.student_id,
            test_name: row.test_name,
            actual_exam_score: defined(row.actual_exam_score),
            low_predicted_exam_score: defined(row.low_predicted_exam_score),
            high_predicted_exam_score: defined(row.high_predicted_exam_score),
        });
        Ok(())
    })?;
    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Drive a CSV reader row by row, handing each decoded row and its 1-based
/// source line to `handle`.
fn for_each_row<R, T, F>(input: R, origin: &Path, mut handle: F) -> Result<()>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
    F: FnMut(T, u64) -> Result<()>,
{
    let csv_err = |source: csv::Error| DashboardError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let headers = reader.headers().map_err(csv_err)?.clone();

    let mut record = StringRecord::new();
    while reader.read_record(&mut record).map_err(csv_err)? {
        let line = record.position().map_or(0, |p| p.line());
        let row: T = record.deserialize(Some(&headers)).map_err(csv_err)?;
        handle(row, line)?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
