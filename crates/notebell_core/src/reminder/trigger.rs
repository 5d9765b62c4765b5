//! Reminder trigger computation.
//!
//! # Responsibility
//! - Parse stored due date (`YYYY-MM-DD`) and reminder time (`H:MM`) strings.
//! - Map a reminder to one wall-clock trigger and to epoch milliseconds.
//!
//! # Invariants
//! - A due date without reminder time triggers at local midnight.
//! - Nonexistent local times (DST gaps) are rejected, never shifted.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static REMINDER_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid reminder time regex"));

pub type ReminderResult<T> = Result<T, ReminderError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    InvalidDueDate(String),
    InvalidReminderTime(String),
    /// Wall-clock trigger falls into a time-zone gap.
    NonexistentLocalTime(NaiveDateTime),
}

impl Display for ReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDueDate(value) => {
                write!(f, "invalid due date `{value}`; expected YYYY-MM-DD")
            }
            Self::InvalidReminderTime(value) => {
                write!(f, "invalid reminder time `{value}`; expected HH:MM")
            }
            Self::NonexistentLocalTime(local) => {
                write!(f, "reminder time {local} does not exist in the local time zone")
            }
        }
    }
}

impl Error for ReminderError {}

pub fn parse_due_date(value: &str) -> ReminderResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ReminderError::InvalidDueDate(value.to_string()))
}

pub fn parse_reminder_time(value: &str) -> ReminderResult<NaiveTime> {
    let invalid = || ReminderError::InvalidReminderTime(value.to_string());
    let caps = REMINDER_TIME_RE.captures(value.trim()).ok_or_else(invalid)?;
    let hours: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minutes: u32 = caps[2].parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

/// Returns the wall-clock moment a reminder fires.
pub fn trigger_local(due_date: &str, reminder_time: Option<&str>) -> ReminderResult<NaiveDateTime> {
    let date = parse_due_date(due_date)?;
    let time = match reminder_time {
        Some(value) => parse_reminder_time(value)?,
        None => NaiveTime::MIN,
    };
    Ok(date.and_time(time))
}

/// Resolves the reminder trigger in `tz` and returns epoch milliseconds.
///
/// Ambiguous local times (DST fold) resolve to the earlier instant.
pub fn trigger_epoch_ms<Tz: TimeZone>(
    due_date: &str,
    reminder_time: Option<&str>,
    tz: &Tz,
) -> ReminderResult<i64> {
    let local = trigger_local(due_date, reminder_time)?;
    tz.from_local_datetime(&local)
        .earliest()
        .map(|resolved| resolved.timestamp_millis())
        .ok_or(ReminderError::NonexistentLocalTime(local))
}

#[cfg(test)]
mod tests {
    use super::{parse_reminder_time, trigger_epoch_ms, trigger_local, ReminderError};
    use chrono::{FixedOffset, NaiveDate, Utc};

    #[test]
    fn reminder_time_accepts_single_digit_hour() {
        let time = parse_reminder_time("9:05").unwrap();
        assert_eq!(time.to_string(), "09:05:00");
    }

    #[test]
    fn reminder_time_rejects_out_of_range_and_garbage() {
        for value in ["24:00", "12:60", "noon", "12:5", "12:30:00", ""] {
            assert!(
                matches!(
                    parse_reminder_time(value),
                    Err(ReminderError::InvalidReminderTime(_))
                ),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn trigger_defaults_to_midnight_without_time() {
        let trigger = trigger_local("2024-03-10", None).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(trigger, expected);
    }

    #[test]
    fn trigger_epoch_respects_time_zone_offset() {
        let utc = trigger_epoch_ms("2024-01-01", Some("10:30"), &Utc).unwrap();
        assert_eq!(utc, 1_704_105_000_000);

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let shifted = trigger_epoch_ms("2024-01-01", Some("10:30"), &plus_two).unwrap();
        assert_eq!(utc - shifted, 2 * 3600 * 1000);
    }

    #[test]
    fn trigger_rejects_invalid_due_date() {
        let err = trigger_local("01/02/2024", Some("10:00")).unwrap_err();
        assert!(matches!(err, ReminderError::InvalidDueDate(_)));
    }
}
