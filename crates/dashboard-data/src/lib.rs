//! Data layer for the tutoring dashboard.
//!
//! Loads the engagement and practice-exam CSV tables, derives the cumulative
//! series for one student and averages the whole class week by week.

pub mod aggregator;
pub mod reader;
pub mod student;
pub mod summary;

pub use aggregator::{ClassAggregates, ClassAggregator, MetricRange, WeeklyClassAverage};
pub use dashboard_core as core;
pub use student::{distinct_student_ids, StudentSeries, StudentWeek};
pub use summary::{AccuracyChange, ClassSummary};
