use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::models::{RecurrenceRule, RecurrenceType};

/// First day of the week used for the weekly "same week" search.
///
/// Weekday numbers in `daysOfWeek` always use 0 = Sunday; this only changes
/// where a week begins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// Offset of `weekday` from the start of its week.
    fn position(self, weekday: Weekday) -> u32 {
        match self {
            WeekStart::Sunday => weekday.num_days_from_sunday(),
            WeekStart::Monday => weekday.num_days_from_monday(),
        }
    }

    /// Offset of a stored weekday number (0 = Sunday) from the start of the week.
    fn position_of(self, day: u8) -> u32 {
        let day = u32::from(day);
        match self {
            WeekStart::Sunday => day,
            WeekStart::Monday => (day + 6) % 7,
        }
    }
}

/// What to do when a monthly rule lands on a day the target month lacks
/// (`dayOfMonth = 31` in April).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthOverflow {
    /// Use the last day of the target month.
    #[default]
    Clamp,
    /// Carry the surplus days into the following month (April 31 -> May 1).
    Roll,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub week_start: WeekStart,
    pub month_overflow: MonthOverflow,
}

/// Computes the next occurrence using default [`EngineOptions`].
///
/// See [`RecurrenceEngine::next_occurrence`].
pub fn compute_next_occurrence(
    due_at: Option<NaiveDateTime>,
    rule: &RecurrenceRule,
) -> Option<NaiveDateTime> {
    RecurrenceEngine::default().next_occurrence(due_at, rule)
}

/// RecurrenceEngine: stateless next-occurrence calculation for routine rules.
///
/// Every method is a pure function of its arguments and the engine options,
/// so the engine is `Copy` and safe to share across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecurrenceEngine {
    options: EngineOptions,
}

impl RecurrenceEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Computes the next due time strictly after `due_at`.
    ///
    /// # Arguments
    /// * `due_at` - Current due time (wall clock). `None` yields `None`.
    /// * `rule` - The recurrence rule to apply
    ///
    /// # Returns
    /// * `Option<NaiveDateTime>` - The next due time, or `None` when the rule
    ///   does not recur or has passed its end date
    ///
    /// # Behavior
    /// - Daily: `interval` days later
    /// - Weekly without weekdays: `interval` weeks later
    /// - Weekly with weekdays: next configured weekday in the current week,
    ///   else the earliest configured weekday `interval` weeks on
    /// - Monthly: `interval` calendar months later, on `dayOfMonth` if set
    /// - Time of day is always copied from `due_at`
    /// - A candidate dated after `endDate` ends the recurrence
    pub fn next_occurrence(
        &self,
        due_at: Option<NaiveDateTime>,
        rule: &RecurrenceRule,
    ) -> Option<NaiveDateTime> {
        let due_at = due_at?;
        let interval = rule.effective_interval();

        let candidate = match rule.kind {
            RecurrenceType::Daily => {
                due_at.checked_add_signed(Duration::days(i64::from(interval)))
            }
            RecurrenceType::Weekly => self.next_weekly(due_at, interval, &rule.weekdays()),
            RecurrenceType::Monthly => self.next_monthly(due_at, interval, rule.month_day()),
            RecurrenceType::None | RecurrenceType::Unknown(_) => None,
        }?;

        if rule.end_date.is_some_and(|end| candidate.date() > end) {
            trace!(%due_at, %candidate, "recurrence ended");
            return None;
        }

        trace!(%due_at, next = %candidate, kind = %rule.kind, "computed next occurrence");
        Some(candidate)
    }

    fn next_weekly(
        &self,
        due_at: NaiveDateTime,
        interval: u32,
        weekdays: &[u8],
    ) -> Option<NaiveDateTime> {
        if weekdays.is_empty() {
            return due_at.checked_add_signed(Duration::weeks(i64::from(interval)));
        }

        let week_start = self.options.week_start;
        let current = week_start.position(due_at.weekday());
        let mut positions: Vec<u32> = weekdays.iter().map(|d| week_start.position_of(*d)).collect();
        positions.sort_unstable();

        // Later in the current week.
        if let Some(position) = positions.iter().find(|p| **p > current) {
            return due_at.checked_add_signed(Duration::days(i64::from(position - current)));
        }

        // Wrap to the earliest configured day, `interval` weeks on.
        let earliest = *positions.first()?;
        let start_of_week = due_at.checked_sub_signed(Duration::days(i64::from(current)))?;
        start_of_week
            .checked_add_signed(Duration::weeks(i64::from(interval)))?
            .checked_add_signed(Duration::days(i64::from(earliest)))
    }

    fn next_monthly(
        &self,
        due_at: NaiveDateTime,
        interval: u32,
        day_of_month: Option<u32>,
    ) -> Option<NaiveDateTime> {
        let months = i64::from(due_at.month0()) + i64::from(interval);
        let year = i32::try_from(i64::from(due_at.year()) + months.div_euclid(12)).ok()?;
        let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;
        let day = day_of_month.unwrap_or_else(|| due_at.day());

        let date = place_day(year, month, day, self.options.month_overflow)?;
        Some(date.and_time(due_at.time()))
    }

    /// Iterates successive occurrences after `start` (exclusive) until the
    /// rule stops producing them.
    pub fn occurrences<'a>(
        &self,
        start: NaiveDateTime,
        rule: &'a RecurrenceRule,
    ) -> Occurrences<'a> {
        Occurrences {
            engine: *self,
            rule,
            current: Some(start),
        }
    }

    /// Collects at most `count` occurrences after `start`.
    pub fn preview(
        &self,
        start: NaiveDateTime,
        rule: &RecurrenceRule,
        count: usize,
    ) -> Vec<NaiveDateTime> {
        self.occurrences(start, rule).take(count).collect()
    }
}

/// Iterator returned by [`RecurrenceEngine::occurrences`].
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    engine: RecurrenceEngine,
    rule: &'a RecurrenceRule,
    current: Option<NaiveDateTime>,
}

impl Iterator for Occurrences<'_> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        self.current = self.engine.next_occurrence(self.current, self.rule);
        self.current
    }
}

impl std::iter::FusedIterator for Occurrences<'_> {}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next_first.signed_duration_since(first).num_days()).ok()
}

fn place_day(year: i32, month: u32, day: u32, overflow: MonthOverflow) -> Option<NaiveDate> {
    let last = days_in_month(year, month)?;
    match overflow {
        MonthOverflow::Clamp => NaiveDate::from_ymd_opt(year, month, day.min(last)),
        MonthOverflow::Roll => NaiveDate::from_ymd_opt(year, month, 1)?
            .checked_add_signed(Duration::days(i64::from(day.saturating_sub(1)))),
    }
}
