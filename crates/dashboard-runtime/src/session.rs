//! One dashboard session: authentication, loaded data and current selection.
//!
//! [`DashboardSession`] is the state the presentation layer reads from. It
//! owns the [`SessionContext`], loads both tables after the first successful
//! authentication, precomputes the class-wide aggregates and rebuilds the
//! selected student's series on every selection change.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use dashboard_core::auth::{AuthState, SessionContext};
use dashboard_core::error::{DashboardError, Result};
use dashboard_data::aggregator::{ClassAggregates, MetricRange, WeeklyClassAverage};
use dashboard_data::student::{distinct_student_ids, StudentSeries};
use dashboard_data::summary::ClassSummary;

use crate::data_manager::DataManager;

// ── DashboardSession ──────────────────────────────────────────────────────────

pub struct DashboardSession {
    ctx: SessionContext,
    data: DataManager,
    /// Distinct ids in first-seen order.
    student_ids: Vec<String>,
    selected: usize,
    student: Option<StudentSeries>,
    class: Option<ClassAggregates>,
    summary: Option<Result<ClassSummary>>,
}

impl DashboardSession {
    pub fn new(engagement_path: impl Into<PathBuf>, test_scores_path: impl Into<PathBuf>) -> Self {
        Self {
            ctx: SessionContext::new(),
            data: DataManager::new(engagement_path, test_scores_path),
            student_ids: Vec::new(),
            selected: 0,
            student: None,
            class: None,
            summary: None,
        }
    }

    // ── Authentication ────────────────────────────────────────────────────

    pub fn auth_state(&self) -> AuthState {
        self.ctx.state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.ctx.is_authenticated()
    }

    /// Check `credential` and, on the first success, load the data.
    ///
    /// A wrong credential returns `AuthenticationFailed` and leaves the
    /// session without data. If loading fails the session stays
    /// authenticated and the next call retries the load.
    pub fn authenticate(&mut self, credential: &str, secret: &str) -> Result<()> {
        self.ctx.authenticate(credential, secret)?;
        if self.class.is_none() {
            self.initialise()?;
        }
        Ok(())
    }

    /// Retry a data load that failed after authentication.
    pub fn retry_load(&mut self) -> Result<()> {
        self.ctx.require_authenticated()?;
        if self.class.is_none() {
            self.initialise()?;
        }
        Ok(())
    }

    // ── Selection ─────────────────────────────────────────────────────────

    pub fn student_ids(&self) -> &[String] {
        &self.student_ids
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_student_id(&self) -> Option<&str> {
        self.student_ids.get(self.selected).map(String::as_str)
    }

    /// Select `id` if it is present in the data. Returns `false` otherwise and
    /// leaves the selection unchanged.
    pub fn select_id(&mut self, id: &str) -> bool {
        match self.student_ids.iter().position(|s| s == id) {
            Some(idx) => {
                self.select_index(idx);
                true
            }
            None => false,
        }
    }

    /// Select `preferred` when present, otherwise the first student.
    pub fn select_preferred(&mut self, preferred: Option<&str>) {
        if let Some(id) = preferred {
            if self.select_id(id) {
                return;
            }
            tracing::warn!(student = id, "requested student not found; using first");
        }
        self.select_index(0);
    }

    /// Move to the next student, wrapping at the end.
    pub fn select_next(&mut self) {
        if !self.student_ids.is_empty() {
            self.select_index((self.selected + 1) % self.student_ids.len());
        }
    }

    /// Move to the previous student, wrapping at the start.
    pub fn select_previous(&mut self) {
        let len = self.student_ids.len();
        if len > 0 {
            self.select_index((self.selected + len - 1) % len);
        }
    }

    // ── Derived views ─────────────────────────────────────────────────────

    /// Series for the selected student, once authenticated and loaded.
    pub fn student(&self) -> Option<&StudentSeries> {
        self.student.as_ref()
    }

    pub fn class(&self) -> Option<&ClassAggregates> {
        self.class.as_ref()
    }

    /// Class summary, or the error explaining why it could not be built.
    pub fn summary(&self) -> Option<&Result<ClassSummary>> {
        self.summary.as_ref()
    }

    /// Description of the last data-load failure, if any.
    pub fn load_error(&self) -> Option<&str> {
        self.data.last_error()
    }

    /// Everything currently on screen, in a serializable form.
    pub fn snapshot(&self) -> Result<DashboardSnapshot<'_>> {
        self.ctx.require_authenticated()?;
        let class = self.class.as_ref().ok_or(DashboardError::NoEngagementData)?;

        let (summary, narrative, summary_error) = match &self.summary {
            Some(Ok(s)) => (Some(s), Some(s.narrative()), None),
            Some(Err(e)) => (None, None, Some(e.to_string())),
            None => (None, None, None),
        };

        Ok(DashboardSnapshot {
            generated_at: Utc::now(),
            student: self.student.as_ref(),
            weekly_class_averages: &class.weekly,
            class_accuracy_range: class.class_accuracy_range,
            attendance_range: class.attendance_range,
            summary,
            narrative,
            summary_error,
        })
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn initialise(&mut self) -> Result<()> {
        let data = self.data.get_data(&self.ctx)?;

        self.student_ids = distinct_student_ids(&data.engagement);
        let class = ClassAggregates::from_records(&data.engagement);
        let summary = ClassSummary::summarize(&class);
        if let Err(e) = &summary {
            tracing::warn!(error = %e, "class summary unavailable");
        }

        self.class = Some(class);
        self.summary = Some(summary);
        self.select_index(0);
        Ok(())
    }

    fn select_index(&mut self, idx: usize) {
        self.selected = idx;
        self.student = None;

        let Some(id) = self.student_ids.get(idx) else {
            return;
        };
        let Ok(data) = self.data.get_data(&self.ctx) else {
            return;
        };
        tracing::debug!(student = %id, "selection changed");
        self.student = Some(StudentSeries::build(&data.engagement, &data.test_scores, id));
    }
}

// ── DashboardSnapshot ─────────────────────────────────────────────────────────

/// JSON export of the current session state.
#[derive(Debug, Serialize)]
pub struct DashboardSnapshot<'a> {
    pub generated_at: DateTime<Utc>,
    pub student: Option<&'a StudentSeries>,
    pub weekly_class_averages: &'a [WeeklyClassAverage],
    pub class_accuracy_range: Option<MetricRange>,
    pub attendance_range: Option<MetricRange>,
    pub summary: Option<&'a ClassSummary>,
    pub narrative: Option<String>,
    pub summary_error: Option<String>,
}

impl DashboardSnapshot<'_> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Atomically write the snapshot to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        tracing::info!(path = %path.display(), "snapshot written");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
