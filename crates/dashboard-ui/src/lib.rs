//! Terminal UI layer for the tutoring dashboard.
//!
//! Provides themes, the header and chart components, the login prompt, the
//! student and class pages, and the application event loop built on top of
//! [`ratatui`].

pub mod app;
pub mod class_view;
pub mod components;
pub mod login_view;
pub mod student_view;
pub mod table_view;
pub mod themes;

pub use dashboard_core as core;
