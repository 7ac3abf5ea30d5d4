//! Date range parsing for message filters
//!
//! Accepts the ISO-8601 shapes agents tend to produce: full RFC 3339
//! timestamps, naive date-times (taken as UTC) and plain dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use domain::DomainError;
use tracing::debug;

/// Which end of a range a bare date stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Plain dates resolve to 00:00:00
    Start,
    /// Plain dates resolve to 23:59:59
    End,
}

/// Parse an ISO-8601 date or date-time into a UTC instant
///
/// # Errors
///
/// Returns [`DomainError::InvalidDateTime`] if the input matches none of the
/// supported formats.
pub fn parse_datetime(input: &str, bound: Bound) -> Result<DateTime<Utc>, DomainError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            debug!(input, format, "Parsed naive date-time as UTC");
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let time = match bound {
            Bound::Start => date.and_hms_opt(0, 0, 0),
            Bound::End => date.and_hms_opt(23, 59, 59),
        };
        if let Some(naive) = time {
            return Ok(naive.and_utc());
        }
    }

    Err(DomainError::InvalidDateTime(format!(
        "'{input}' is not an ISO-8601 date or date-time"
    )))
}

/// Parse optional `after`/`before` arguments into a validated range
///
/// # Errors
///
/// Returns a validation error listing unparseable bounds and an inverted range.
pub fn parse_range(
    after: Option<&str>,
    before: Option<&str>,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), DomainError> {
    let mut violations = Vec::new();

    let mut parse = |name: &str, value: Option<&str>, bound: Bound| {
        value
            .filter(|v| !v.trim().is_empty())
            .and_then(|v| match parse_datetime(v, bound) {
                Ok(dt) => Some(dt),
                Err(e) => {
                    violations.push(format!("{name}: {e}"));
                    None
                },
            })
    };

    let after = parse("after", after, Bound::Start);
    let before = parse("before", before, Bound::End);

    if let (Some(a), Some(b)) = (after, before) {
        if a > b {
            violations.push("after must not be later than before".to_string());
        }
    }

    if violations.is_empty() {
        Ok((after, before))
    } else {
        Err(DomainError::Validation(violations))
    }
}
