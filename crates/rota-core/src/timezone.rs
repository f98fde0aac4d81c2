use crate::error::CoreError;
use crate::models::{RecurrenceRule, ScheduledOccurrence};
use crate::recurrence::RecurrenceEngine;
use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Validate IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone.trim())
        .map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))
}

/// Map a wall-clock time onto an instant in `tz`.
///
/// Ambiguous times (clocks falling back) take the earlier instant. Times that
/// do not exist (clocks springing forward) are pushed one hour later.
pub fn resolve_local(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let shifted = local.checked_add_signed(Duration::hours(1))?;
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}

/// Runs the engine on the wall clock of `tz` for an instant stored in UTC.
///
/// A 09:00 routine in New York stays at 09:00 local across DST changes, so
/// its UTC instant shifts by an hour twice a year.
pub fn next_occurrence_in_timezone(
    due_at: DateTime<Utc>,
    rule: &RecurrenceRule,
    tz: &Tz,
    engine: &RecurrenceEngine,
) -> Option<DateTime<Utc>> {
    let local = due_at.with_timezone(tz).naive_local();
    let next_local = engine.next_occurrence(Some(local), rule)?;
    resolve_local(tz, next_local)
}

/// Steps a stored occurrence forward by one rule application.
///
/// A timed value written with an offset is an instant; when the routine has a
/// zone, the rule runs on that zone's wall clock and the result is written
/// back with the original offset. Everything else steps on the stored
/// wall-clock time as is.
pub fn next_scheduled(
    current: &ScheduledOccurrence,
    rule: &RecurrenceRule,
    zone: Option<&Tz>,
    engine: &RecurrenceEngine,
) -> Option<ScheduledOccurrence> {
    let (Some(tz), Some(offset), false) = (zone, current.offset, current.all_day) else {
        return engine
            .next_occurrence(Some(current.due_at), rule)
            .map(|next| current.with_due_at(next));
    };
    let instant = offset
        .from_local_datetime(&current.due_at)
        .single()?
        .with_timezone(&Utc);
    let next = next_occurrence_in_timezone(instant, rule, tz, engine)?;
    Some(current.with_due_at(next.with_timezone(&offset).naive_local()))
}

/// Format datetime with timezone-aware display
pub fn format_with_timezone(datetime: DateTime<Utc>, tz: &Tz, format: &str) -> String {
    datetime.with_timezone(tz).format(format).to_string()
}
