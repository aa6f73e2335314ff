//! Session layer for the tutoring dashboard.
//!
//! Owns authentication state, loads the input tables once per session and
//! keeps the derived student and class views in sync with the selection.

pub mod data_manager;
pub mod session;

pub use dashboard_core as core;
pub use dashboard_data as data;
pub use data_manager::{DataManager, Datasets};
pub use session::{DashboardSession, DashboardSnapshot};
