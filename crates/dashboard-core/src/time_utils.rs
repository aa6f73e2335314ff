use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use regex::Regex;

// ── Calendar dates ────────────────────────────────────────────────────────────

/// Date-only layouts accepted in the CSV sources.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Date-time layouts whose time-of-day component is discarded.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a calendar date, stripping any time-of-day component.
///
/// Returns `None` for empty strings or unrecognised formats.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

// ── Clock-style durations ─────────────────────────────────────────────────────

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:(\d+)\s+days?,?\s*)?(\d+):([0-5]?\d):([0-5]?\d)(?:\.(\d{1,9}))?$")
            .expect("regex is valid")
    })
}

/// Parse a clock-style duration such as `"02:15:30"`, `"1:05:00.5"` or
/// `"1 days 03:00:00"`.
///
/// The hour field is not capped at 23, so `"26:00:00"` is 26 hours.
pub fn parse_duration(s: &str) -> Option<TimeDelta> {
    let caps = duration_regex().captures(s.trim())?;

    let days: i64 = caps.get(1).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let hours: i64 = caps[2].parse().ok()?;
    let minutes: i64 = caps[3].parse().ok()?;
    let seconds: i64 = caps[4].parse().ok()?;
    let nanos: i64 = match caps.get(5) {
        Some(frac) => {
            let digits = frac.as_str();
            let value: i64 = digits.parse().ok()?;
            value * 10_i64.pow(9 - digits.len() as u32)
        }
        None => 0,
    };

    let whole = TimeDelta::try_days(days)?
        .checked_add(&TimeDelta::try_hours(hours)?)?
        .checked_add(&TimeDelta::try_minutes(minutes)?)?
        .checked_add(&TimeDelta::try_seconds(seconds)?)?;
    whole.checked_add(&TimeDelta::nanoseconds(nanos))
}

/// Total seconds in `duration`, including the sub-second part.
pub fn total_seconds(duration: TimeDelta) -> f64 {
    duration.num_seconds() as f64 + f64::from(duration.subsec_nanos()) / 1e9
}

/// Convert `duration` into hours rounded half-to-even to one decimal place.
///
/// ```
/// use chrono::TimeDelta;
/// use dashboard_core::time_utils::duration_to_hours;
///
/// assert_eq!(duration_to_hours(TimeDelta::minutes(90)), 1.5);
/// assert_eq!(duration_to_hours(TimeDelta::seconds(7_500)), 2.1);
/// ```
pub fn duration_to_hours(duration: TimeDelta) -> f64 {
    round_half_even(total_seconds(duration) / 3600.0, 1)
}

/// Round `value` to `decimals` places, ties going to the even digit.
pub fn round_half_even(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

// ── Tests ──────────────────────────────────────────────────────────────────────
