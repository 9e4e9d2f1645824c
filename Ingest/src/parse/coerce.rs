//! Field coercion helpers shared by the parsers.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Width of `dd/Mon/yy` in tracker exports.
const EXPORT_DATE_WIDTH: usize = 9;

const EXPORT_DATE_FORMAT: &str = "%d/%b/%y";

/// Why a single field value could not be coerced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoerceError {
    #[error("value is blank")]
    Blank,

    #[error("'{0}' is not a non-negative integer")]
    NotAnInteger(String),

    #[error("'{0}' is not a duration (mm:ss or hh:mm:ss)")]
    Duration(String),

    #[error("'{0}' is not a k/d/a triple")]
    Kda(String),

    #[error("'{value}' does not match '{format}'")]
    Date { value: String, format: &'static str },
}

/// Blank text becomes `None`.
pub fn optional_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Blank or non-numeric text becomes `None`.
pub fn optional_f64(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            log::debug!("Treating non-numeric value '{}' as absent", trimmed);
            None
        }
    }
}

/// Optional integer exported in floating form (`10.0`), truncated.
pub fn optional_int_from_float(s: &str) -> Option<i64> {
    optional_f64(s).map(|value| value.trunc() as i64)
}

/// Required non-negative integer.
pub fn required_u64(s: &str) -> Result<u64, CoerceError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(CoerceError::Blank);
    }
    trimmed
        .parse()
        .map_err(|_| CoerceError::NotAnInteger(trimmed.to_string()))
}

fn small_int(part: &str, whole: &str) -> Result<u32, CoerceError> {
    part.trim()
        .parse()
        .map_err(|_| CoerceError::Duration(whole.to_string()))
}

/// Parse `mm:ss` or `hh:mm:ss` into whole minutes, plus one for the
/// partially played last minute.
pub fn duration_minutes(s: &str) -> Result<u32, CoerceError> {
    let trimmed = s.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [minutes, seconds] => (0, small_int(minutes, trimmed)?, small_int(seconds, trimmed)?),
        [hours, minutes, seconds] => (
            small_int(hours, trimmed)?,
            small_int(minutes, trimmed)?,
            small_int(seconds, trimmed)?,
        ),
        _ => return Err(CoerceError::Duration(trimmed.to_string())),
    };
    let total_seconds = u64::from(hours) * 3600 + u64::from(minutes) * 60 + u64::from(seconds);
    u32::try_from(total_seconds / 60 + 1).map_err(|_| CoerceError::Duration(trimmed.to_string()))
}

/// Parse `kills/deaths/assists`.
pub fn kda(s: &str) -> Result<(u32, u32, u32), CoerceError> {
    let trimmed = s.trim();
    let parts: Vec<u32> = trimmed
        .split('/')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| CoerceError::Kda(trimmed.to_string()))?;
    match parts.as_slice() {
        [kills, deaths, assists] => Ok((*kills, *deaths, *assists)),
        _ => Err(CoerceError::Kda(trimmed.to_string())),
    }
}

/// Drop a trailing `Z` or `[+-]hh:mm` offset. Only the time part is searched,
/// so the dashes of the date are never taken for an offset.
fn strip_offset(s: &str) -> &str {
    if let Some(local) = s.strip_suffix('Z') {
        return local;
    }
    let Some(time_start) = s.find('T') else {
        return s;
    };
    match s[time_start..].rfind(['+', '-']) {
        Some(sign) => &s[..time_start + sign],
        None => s,
    }
}

/// Parse an ISO date-time, dropping any timezone offset suffix.
pub fn date_time_without_offset(s: &str) -> Result<NaiveDateTime, CoerceError> {
    let trimmed = s.trim();
    NaiveDateTime::parse_from_str(strip_offset(trimmed), DATE_TIME_FORMAT).map_err(|_| CoerceError::Date {
        value: trimmed.to_string(),
        format: DATE_TIME_FORMAT,
    })
}

/// Parse the `dd/Mon/yy` prefix of an export timestamp. Blank is `None`.
pub fn export_date(s: &str) -> Result<Option<NaiveDate>, CoerceError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let prefix = trimmed.get(..EXPORT_DATE_WIDTH).unwrap_or(trimmed);
    NaiveDate::parse_from_str(prefix, EXPORT_DATE_FORMAT)
        .map(Some)
        .map_err(|_| CoerceError::Date {
            value: trimmed.to_string(),
            format: EXPORT_DATE_FORMAT,
        })
}

/// Split `tag:tag:tag` into a set, dropping empty fragments.
pub fn tag_set(s: &str) -> BTreeSet<String> {
    s.split(':')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Number following `prefix` in a sprint name.
pub fn sprint_number(sprint: Option<&str>, prefix: &str) -> Option<u32> {
    sprint?.strip_prefix(prefix)?.trim().parse().ok()
}

/// Trailing path segment of a link, as an id (`/matches/123?x=y` → 123).
pub fn trailing_id(href: &str) -> Result<u64, CoerceError> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or(path);
    required_u64(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_rounds_up() {
        assert_eq!(duration_minutes("05:30"), Ok(6));
        assert_eq!(duration_minutes("1:02:30"), Ok(63));
        assert_eq!(duration_minutes("40:00"), Ok(41));
        assert_eq!(duration_minutes("0:59"), Ok(1));
    }

    #[test]
    fn test_duration_rejects_other_shapes() {
        assert!(duration_minutes("42").is_err());
        assert!(duration_minutes("1:2:3:4").is_err());
        assert!(duration_minutes("ab:cd").is_err());
        assert!(duration_minutes("").is_err());
    }

    #[test]
    fn test_duration_overflow_is_an_error() {
        assert_eq!(
            duration_minutes("99999999:00"),
            Ok(99_999_999 + 1)
        );
        assert_eq!(
            duration_minutes("4294967295:00:00"),
            Err(CoerceError::Duration("4294967295:00:00".to_string()))
        );
        assert!(duration_minutes("4294967295:4294967295").is_err());
    }

    #[test]
    fn test_kda() {
        assert_eq!(kda("10/2/7"), Ok((10, 2, 7)));
        assert_eq!(kda(" 0 / 0 / 0 "), Ok((0, 0, 0)));
        assert!(kda("10/2").is_err());
        assert!(kda("a/b/c").is_err());
    }

    #[test]
    fn test_date_time_drops_offset() {
        let expected = NaiveDate::from_ymd_opt(2013, 7, 21)
            .unwrap()
            .and_hms_opt(18, 4, 12)
            .unwrap();
        assert_eq!(date_time_without_offset("2013-07-21T18:04:12+00:00"), Ok(expected));
        assert_eq!(date_time_without_offset("2013-07-21T18:04:12Z"), Ok(expected));
        assert_eq!(date_time_without_offset("2013-07-21T18:04:12-05:00"), Ok(expected));
        assert_eq!(date_time_without_offset("2013-07-21T18:04:12"), Ok(expected));

        let fractional = date_time_without_offset("2013-07-21T18:04:12.5-05:00").unwrap();
        assert_eq!(fractional.to_string(), "2013-07-21 18:04:12.500");
        assert_eq!(
            date_time_without_offset("2013-07-21T18:04:12.250+03:00")
                .unwrap()
                .to_string(),
            "2013-07-21 18:04:12.250"
        );
        assert!(date_time_without_offset("yesterday").is_err());
    }

    #[test]
    fn test_export_date() {
        assert_eq!(
            export_date("12/Mar/24 3:15 PM"),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 12))
        );
        assert_eq!(export_date("   "), Ok(None));
        assert!(export_date("2024-03-12").is_err());
    }

    #[test]
    fn test_optional_numbers() {
        assert_eq!(optional_f64(""), None);
        assert_eq!(optional_f64("3.5"), Some(3.5));
        assert_eq!(optional_f64("lots"), None);
        assert_eq!(optional_int_from_float("10042.0"), Some(10042));
        assert_eq!(optional_int_from_float("  "), None);
    }

    #[test]
    fn test_required_u64() {
        assert_eq!(required_u64(" 17 "), Ok(17));
        assert_eq!(required_u64(""), Err(CoerceError::Blank));
        assert!(required_u64("-3").is_err());
    }

    #[test]
    fn test_tag_set() {
        let tags = tag_set("noun:inanim:m:v_naz:");
        assert_eq!(tags.len(), 4);
        assert!(tags.contains("v_naz"));
        assert!(tag_set("").is_empty());
    }

    #[test]
    fn test_sprint_number() {
        assert_eq!(sprint_number(Some("TTKG2 Sprint 14"), "TTKG2 Sprint "), Some(14));
        assert_eq!(sprint_number(Some("Backlog"), "TTKG2 Sprint "), None);
        assert_eq!(sprint_number(None, "TTKG2 Sprint "), None);
    }

    #[test]
    fn test_trailing_id() {
        assert_eq!(trailing_id("/matches/732793094"), Ok(732793094));
        assert_eq!(trailing_id("https://example.com/matches/5/?tab=log"), Ok(5));
        assert!(trailing_id("/matches/").is_err());
    }
}
