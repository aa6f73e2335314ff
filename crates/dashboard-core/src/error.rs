use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the tutor dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV source could not be decoded into records.
    #[error("Failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A date cell did not match any recognised calendar-date format.
    #[error("Invalid date in {} column `{column}` (line {line}): {value:?}", .path.display())]
    DateParse {
        path: PathBuf,
        column: &'static str,
        line: u64,
        value: String,
    },

    /// A `time_spent` cell is not a clock-style duration.
    #[error("Invalid duration in {} (line {line}): {value:?}", .path.display())]
    DurationParse {
        path: PathBuf,
        line: u64,
        value: String,
    },

    /// The JSON export could not be serialized.
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A week required by the class summary is not present in the data.
    #[error("No class data for week {0}")]
    MissingWeek(u32),

    /// The engagement table contains no rows.
    #[error("Engagement data is empty")]
    NoEngagementData,

    /// The supplied credential does not match the stored secret.
    #[error("Password incorrect")]
    AuthenticationFailed,

    /// Data access was attempted before a successful authentication.
    #[error("Session is not authenticated")]
    NotAuthenticated,

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
