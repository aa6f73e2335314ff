//! Shared types for the tutor dashboard.
//!
//! Engagement and test-score records, the error type, CLI settings,
//! authentication, duration/date parsing and display formatting used by the
//! data, runtime and UI crates.

pub mod auth;
pub mod calculations;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, Result};
