//! Session-scoped loader for the two input tables.
//!
//! [`DataManager`] reads the engagement and practice-exam CSV files at most
//! once per session, and only after the session has authenticated. Callers
//! use [`DataManager::get_data`] to obtain the cached [`Datasets`].

use std::path::PathBuf;

use dashboard_core::auth::SessionContext;
use dashboard_core::error::Result;
use dashboard_core::models::{EngagementRecord, TestScoreRecord};
use dashboard_data::reader::{load_engagement, load_test_scores};

// ── Datasets ──────────────────────────────────────────────────────────────────

/// Both tables, exactly as loaded.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub engagement: Vec<EngagementRecord>,
    pub test_scores: Vec<TestScoreRecord>,
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Lazy, load-once wrapper around the CSV readers.
///
/// # Example
/// ```no_run
/// use dashboard_core::auth::SessionContext;
/// use dashboard_runtime::data_manager::DataManager;
///
/// let mut ctx = SessionContext::new();
/// ctx.authenticate("s3cret", "s3cret").unwrap();
///
/// let mut mgr = DataManager::new("engagement.csv", "tests.csv");
/// let data = mgr.get_data(&ctx).unwrap();
/// println!("{} engagement rows", data.engagement.len());
/// ```
pub struct DataManager {
    engagement_path: PathBuf,
    test_scores_path: PathBuf,
    /// Tables from the first successful load.
    cache: Option<Datasets>,
    /// Human-readable description of the last load error.
    last_error: Option<String>,
}

impl DataManager {
    pub fn new(engagement_path: impl Into<PathBuf>, test_scores_path: impl Into<PathBuf>) -> Self {
        Self {
            engagement_path: engagement_path.into(),
            test_scores_path: test_scores_path.into(),
            cache: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return both tables, loading them on first use.
    ///
    /// Fails with `NotAuthenticated` before the session has authenticated;
    /// nothing is read from disk in that case. Load errors are returned and
    /// remembered in [`last_error`](Self::last_error); the next call retries.
    pub fn get_data(&mut self, ctx: &SessionContext) -> Result<&Datasets> {
        ctx.require_authenticated()?;

        let data = match self.cache.take() {
            Some(data) => data,
            None => self.load_logged()?,
        };
        Ok(self.cache.insert(data))
    }

    /// `true` once both tables have been read.
    pub fn is_loaded(&self) -> bool {
        self.cache.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn load_logged(&mut self) -> Result<Datasets> {
        match self.load() {
            Ok(data) => {
                tracing::info!(
                    engagement_rows = data.engagement.len(),
                    test_rows = data.test_scores.len(),
                    "datasets loaded"
                );
                self.last_error = None;
                Ok(data)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load datasets");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn load(&self) -> Result<Datasets> {
        let engagement = load_engagement(&self.engagement_path)?;
        let test_scores = load_test_scores(&self.test_scores_path)?;
        Ok(Datasets {
            engagement,
            test_scores,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
