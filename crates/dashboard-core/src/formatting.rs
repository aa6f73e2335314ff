/// Placeholder rendered wherever a value is undefined.
pub const MISSING: &str = "—";

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let formatted = format!("{:.prec$}", value.abs(), prec = decimals as usize);

    let (int_str, frac_str) = match formatted.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (formatted.as_str(), None),
    };

    let grouped = group_thousands(int_str);
    let result = match frac_str {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    };

    if negative && result.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a fraction as a percentage with `decimals` places.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_percent;
///
/// assert_eq!(format_percent(0.5, 0), "50%");
/// assert_eq!(format_percent(0.6667, 1), "66.7%");
/// assert_eq!(format_percent(-0.05, 0), "-5%");
/// ```
pub fn format_percent(fraction: f64, decimals: u32) -> String {
    format!("{:.prec$}%", fraction * 100.0, prec = decimals as usize)
}

/// Format an optional fraction as a percentage, or [`MISSING`].
pub fn format_optional_percent(fraction: Option<f64>, decimals: u32) -> String {
    fraction.map_or_else(|| MISSING.to_string(), |v| format_percent(v, decimals))
}

/// Format an optional number with thousands separators, or [`MISSING`].
pub fn format_optional_number(value: Option<f64>, decimals: u32) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format_number(v, decimals))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
