//! Human-readable time formatting
//!
//! Provides the `m:ss` durations shown on track cards, ISO-8601 duration
//! parsing for API responses and the relative "added" labels of the library.

use chrono::{DateTime, Utc};

/// Format seconds as `m:ss`
///
/// Fractional seconds are floored. Negative, NaN or infinite input renders
/// as `0:00`.
///
/// # Examples
///
/// ```
/// use r2v_common::human_time::format_mm_ss;
///
/// assert_eq!(format_mm_ss(0.0), "0:00");
/// assert_eq!(format_mm_ss(75.9), "1:15");
/// assert_eq!(format_mm_ss(3723.0), "62:03");
/// ```
pub fn format_mm_ss(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Parse an ISO-8601 duration of the form `PT#H#M#S`
///
/// Every component is optional (`PT45S`, `PT3M`, `PT1H2M3S`). Day or week
/// components are not produced by the video API and are rejected.
///
/// # Examples
///
/// ```
/// use r2v_common::human_time::parse_iso8601_duration;
///
/// assert_eq!(parse_iso8601_duration("PT4M13S"), Some(253));
/// assert_eq!(parse_iso8601_duration("PT1H"), Some(3600));
/// assert_eq!(parse_iso8601_duration("P1D"), None);
/// ```
pub fn parse_iso8601_duration(iso: &str) -> Option<u64> {
    let rest = iso.trim().strip_prefix("PT")?;

    let mut total: u64 = 0;
    let mut digits = String::new();
    // Units must appear in H, M, S order
    let mut last_unit = 0u8;

    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let (rank, multiplier) = match c {
            'H' => (1, 3600),
            'M' => (2, 60),
            'S' => (3, 1),
            _ => return None,
        };
        if rank <= last_unit || digits.is_empty() {
            return None;
        }
        let value: u64 = digits.parse().ok()?;
        total = total.checked_add(value.checked_mul(multiplier)?)?;
        digits.clear();
        last_unit = rank;
    }

    if !digits.is_empty() {
        return None;
    }
    Some(total)
}

/// Convert an optional ISO-8601 duration to `m:ss`, hours folded into minutes
///
/// Missing or malformed input renders as `0:00`.
pub fn iso_duration_to_mm_ss(iso: Option<&str>) -> String {
    iso.and_then(parse_iso8601_duration)
        .map(|secs| format_mm_ss(secs as f64))
        .unwrap_or_else(|| "0:00".to_string())
}

/// Relative label for when a library entry was added
///
/// - 1 day (or less) → `Yesterday`
/// - under a week → `N days ago`
/// - under 30 days → `N weeks ago` (rounded up)
/// - otherwise the calendar date (`YYYY-MM-DD`)
pub fn relative_day_label(added: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = (now - added).num_milliseconds().unsigned_abs();
    let days = diff_ms.div_ceil(86_400_000);

    if days <= 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{} days ago", days)
    } else if days < 30 {
        format!("{} weeks ago", days.div_ceil(7))
    } else {
        added.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_mm_ss_pads_seconds() {
        assert_eq!(format_mm_ss(5.0), "0:05");
        assert_eq!(format_mm_ss(60.0), "1:00");
        assert_eq!(format_mm_ss(29.999), "0:29");
    }

    #[test]
    fn test_format_mm_ss_invalid_input() {
        assert_eq!(format_mm_ss(-3.0), "0:00");
        assert_eq!(format_mm_ss(f64::NAN), "0:00");
        assert_eq!(format_mm_ss(f64::INFINITY), "0:00");
    }

    #[test]
    fn test_parse_iso_components() {
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration("PT3M"), Some(180));
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso8601_duration("PT0S"), Some(0));
    }

    #[test]
    fn test_parse_iso_rejects_malformed() {
        assert_eq!(parse_iso8601_duration(""), None);
        assert_eq!(parse_iso8601_duration("4M13S"), None);
        assert_eq!(parse_iso8601_duration("PT3S4M"), None);
        assert_eq!(parse_iso8601_duration("PT12"), None);
        assert_eq!(parse_iso8601_duration("PTM"), None);
    }

    #[test]
    fn test_iso_to_mm_ss_folds_hours() {
        assert_eq!(iso_duration_to_mm_ss(Some("PT1H2M3S")), "62:03");
        assert_eq!(iso_duration_to_mm_ss(Some("PT4M13S")), "4:13");
        assert_eq!(iso_duration_to_mm_ss(None), "0:00");
        assert_eq!(iso_duration_to_mm_ss(Some("garbage")), "0:00");
    }

    #[test]
    fn test_relative_day_labels() {
        let now = Utc::now();
        assert_eq!(relative_day_label(now - Duration::days(1), now), "Yesterday");
        assert_eq!(relative_day_label(now - Duration::days(3), now), "3 days ago");
        assert_eq!(relative_day_label(now - Duration::days(8), now), "2 weeks ago");
        assert_eq!(relative_day_label(now - Duration::days(14), now), "2 weeks ago");

        let old = now - Duration::days(45);
        assert_eq!(relative_day_label(old, now), old.format("%Y-%m-%d").to_string());
    }
}
