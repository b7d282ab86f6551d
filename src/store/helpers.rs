use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::WorkoutStatus;

/// Millisecond precision and a literal `Z` keep the stored strings fixed
/// width, so SQLite's string comparison matches chronological order.
pub fn fmt_datetime(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_status(value: &str) -> Result<WorkoutStatus> {
    match value {
        "Running" => Ok(WorkoutStatus::Running),
        "Completed" => Ok(WorkoutStatus::Completed),
        "Interrupted" => Ok(WorkoutStatus::Interrupted),
        other => Err(anyhow!("unknown workout status {other}")),
    }
}

pub fn to_bpm(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{field} holds invalid bpm value {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn datetime_round_trips() {
        let dt = Utc.with_ymd_and_hms(2020, 3, 21, 18, 30, 5).unwrap();
        let parsed = parse_datetime(&fmt_datetime(dt), "test").unwrap();
        assert_eq!(parsed, dt);
    }

    #[test]
    fn formatted_datetimes_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2020, 3, 21, 18, 30, 5).unwrap();
        let later = earlier + chrono::Duration::milliseconds(1);
        assert!(fmt_datetime(earlier) < fmt_datetime(later));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(parse_status("Paused").is_err());
    }
}
