//! Reusable widgets shared by the dashboard pages.

pub mod chart;
pub mod header;
