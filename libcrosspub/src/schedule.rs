//! Schedule time parsing
//!
//! Parses the human-readable time formats the compose CLI accepts for
//! scheduled posts.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, ValidationError};

/// Parse a schedule string into a DateTime
///
/// Supports multiple formats:
/// - RFC 3339 timestamps: "2026-09-01T15:00:00Z"
/// - Relative durations: "1h", "30m", "2d", "1 hour"
/// - Natural language: "tomorrow", "next friday"
///
/// # Errors
///
/// Returns `ValidationError::InvalidSchedule` if the string matches none of
/// the supported formats.
pub fn parse_schedule(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(
            ValidationError::InvalidSchedule("Schedule string cannot be empty".to_string()).into(),
        );
    }

    // Exact timestamps first; they are unambiguous
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(duration) = parse_duration(input) {
        return Ok(Utc::now() + duration);
    }

    if let Ok(dt) = parse_natural_language(input) {
        return Ok(dt);
    }

    Err(ValidationError::InvalidSchedule(format!(
        "Could not parse schedule string: {}",
        input
    ))
    .into())
}

/// Parse a duration string into a chrono::Duration
fn parse_duration(input: &str) -> Result<Duration> {
    if let Ok(std_duration) = humantime::parse_duration(input) {
        let seconds = std_duration.as_secs() as i64;
        return Duration::try_seconds(seconds).ok_or_else(|| {
            ValidationError::InvalidSchedule("Duration out of range".to_string()).into()
        });
    }

    Err(ValidationError::InvalidSchedule(format!("Could not parse duration: {}", input)).into())
}

/// Parse natural language time expression
fn parse_natural_language(input: &str) -> Result<DateTime<Utc>> {
    chrono_english::parse_date_string(input, Utc::now(), chrono_english::Dialect::Us)
        .map_err(|e| ValidationError::InvalidSchedule(format!("Could not parse time: {}", e)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrosspubError;

    #[test]
    fn test_parse_rfc3339() {
        let result = parse_schedule("2026-09-01T15:00:00Z").unwrap();
        assert_eq!(result.to_rfc3339(), "2026-09-01T15:00:00+00:00");
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let result = parse_schedule("2026-09-01T15:00:00+02:00").unwrap();
        assert_eq!(result.to_rfc3339(), "2026-09-01T13:00:00+00:00");
    }

    #[test]
    fn test_parse_duration_minutes() {
        let scheduled_time = parse_schedule("30m").unwrap();
        let diff = (scheduled_time - Utc::now()).num_minutes();

        // Should be approximately 30 minutes from now (allow 1 minute tolerance)
        assert!(
            (29..=31).contains(&diff),
            "Expected ~30 minutes, got {}",
            diff
        );
    }

    #[test]
    fn test_parse_duration_hours() {
        let scheduled_time = parse_schedule("2h").unwrap();
        let diff = (scheduled_time - Utc::now()).num_minutes();

        assert!(
            (119..=121).contains(&diff),
            "Expected ~120 minutes, got {}",
            diff
        );
    }

    #[test]
    fn test_parse_duration_days() {
        let scheduled_time = parse_schedule("1d").unwrap();
        let diff = (scheduled_time - Utc::now()).num_hours();

        assert!((23..=25).contains(&diff), "Expected ~24 hours, got {}", diff);
    }

    #[test]
    fn test_parse_duration_with_space() {
        let scheduled_time = parse_schedule("1 hour").unwrap();
        let diff = (scheduled_time - Utc::now()).num_minutes();

        assert!(
            (59..=61).contains(&diff),
            "Expected ~60 minutes, got {}",
            diff
        );
    }

    #[test]
    fn test_parse_tomorrow() {
        let scheduled_time = parse_schedule("tomorrow").unwrap();
        let diff = (scheduled_time - Utc::now()).num_hours();

        // Approximately a day out, exact hour depends on the parser's anchor
        assert!((20..=28).contains(&diff), "Expected ~24 hours, got {}", diff);
    }

    #[test]
    fn test_parse_empty_string() {
        let err = parse_schedule("   ").unwrap_err();
        assert!(matches!(
            err,
            CrosspubError::Validation(ValidationError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn test_parse_invalid_format() {
        let err = parse_schedule("not a time").unwrap_err();
        match err {
            CrosspubError::Validation(ValidationError::InvalidSchedule(message)) => {
                assert!(message.contains("not a time"));
            }
            other => panic!("expected InvalidSchedule, got {:?}", other),
        }
    }
}
