//! Timestamp rendering for snapshots.
//!
//! Every instant on the wire is RFC 3339 in UTC with second precision
//! (`2026-10-18T14:30:00Z`), so plain string comparison sorts them
//! chronologically. An absent instant is the empty string.

use chrono::{DateTime, SecondsFormat, Utc};

pub fn format_time(t: Option<DateTime<Utc>>) -> String {
    t.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

pub fn format_times(times: &[DateTime<Utc>]) -> Vec<String> {
    times.iter().map(|t| format_time(Some(*t))).collect()
}

/// Inverse of [`format_time`]: `""` is `Ok(None)`.
pub fn parse_time(s: &str) -> Result<Option<DateTime<Utc>>, chrono::ParseError> {
    if s.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(s).map(|t| Some(t.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn absent_time_is_empty_string() {
        assert_eq!(format_time(None), "");
        assert_eq!(parse_time("").unwrap(), None);
    }

    #[test]
    fn second_precision_utc() {
        let t = Utc.with_ymd_and_hms(2026, 10, 18, 14, 30, 0).unwrap()
            + chrono::Duration::milliseconds(750);
        assert_eq!(format_time(Some(t)), "2026-10-18T14:30:00Z");
    }

    #[test]
    fn parse_accepts_formatted_output() {
        let t = Utc.with_ymd_and_hms(2027, 1, 2, 3, 4, 5).unwrap();
        let s = format_time(Some(t));
        assert_eq!(parse_time(&s).unwrap(), Some(t));
        assert!(parse_time("yesterday").is_err());
    }
}
