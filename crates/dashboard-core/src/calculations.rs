use std::fmt;

use serde::{Deserialize, Serialize};

/// `numerator / denominator`, or `None` when the denominator is zero.
///
/// A zero denominator means "nothing scheduled yet"; the result must read as
/// missing data downstream, never as a 0 % rate.
pub fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// Arithmetic mean of the defined values, skipping `None` and NaN.
///
/// Returns `None` when no defined value remains.
pub fn mean_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold((0.0_f64, 0_u32), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / f64::from(count))
    }
}

/// Smallest and largest defined values, or `None` when there are none.
pub fn min_max_defined<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// Sign label for a first-week to latest-week change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    /// `Increased` only for a strictly positive change. Zero and undefined
    /// changes are both `Decreased`.
    pub fn from_change(change: Option<f64>) -> Self {
        match change {
            Some(delta) if delta > 0.0 => Direction::Increased,
            _ => Direction::Decreased,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Increased => f.write_str("increased"),
            Direction::Decreased => f.write_str("decreased"),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
