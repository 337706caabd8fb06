//! Shared helpers and constants.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

pub const APP_NAME: &str = "artrans_backend";

pub fn now_utc_iso() -> String {
    Utc::now().to_rfc3339()
}

/// Parses a timestamp from an Artrans export into RFC 3339.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f] [+ZZZZ [ABBR]]` and the bare naive
/// form (taken as UTC). Returns `None` when nothing matches.
pub fn parse_source_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc).to_rfc3339());
    }

    // Some exporters append a zone abbreviation after the numeric offset.
    let without_abbr = match trimmed.rsplit_once(' ') {
        Some((head, tail)) if tail.chars().all(|c| c.is_ascii_alphabetic()) => head,
        _ => trimmed,
    };
    if let Ok(parsed) = DateTime::parse_from_str(without_abbr, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Some(parsed.with_timezone(&Utc).to_rfc3339());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(without_abbr, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive).to_rfc3339());
    }
    None
}

/// Like [`parse_source_date`] but falls back to the current time.
pub fn source_date_or_now(raw: &str) -> String {
    parse_source_date(raw).unwrap_or_else(|| {
        if !raw.trim().is_empty() {
            tracing::debug!(raw, "unrecognised source timestamp, using current time");
        }
        now_utc_iso()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        assert_eq!(
            parse_source_date("2021-03-04T05:06:07+08:00").as_deref(),
            Some("2021-03-03T21:06:07+00:00")
        );
    }

    #[test]
    fn parses_naive_as_utc() {
        assert_eq!(
            parse_source_date("2021-03-04 05:06:07").as_deref(),
            Some("2021-03-04T05:06:07+00:00")
        );
    }

    #[test]
    fn parses_offset_with_zone_abbreviation() {
        assert_eq!(
            parse_source_date("2021-03-04 05:06:07 +0800 CST").as_deref(),
            Some("2021-03-03T21:06:07+00:00")
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_source_date("yesterday").is_none());
        assert!(parse_source_date("   ").is_none());
        assert!(!source_date_or_now("").is_empty());
    }
}
