use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{FilterSet, Routine, ScheduledOccurrence};
use crate::recurrence::{EngineOptions, RecurrenceEngine};
use crate::timezone::next_scheduled;

/// Configuration for calendar projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionOptions {
    /// Hard cap on engine invocations per routine per date.
    pub max_iterations: usize,
    #[serde(flatten)]
    pub engine: EngineOptions,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            engine: EngineOptions::default(),
        }
    }
}

/// One routine occurring on a calendar date. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEntry<'a> {
    pub routine: &'a Routine,
    pub occurrence: ScheduledOccurrence,
    /// `false` for the routine's stored occurrence, `true` for a computed one.
    pub is_projected: bool,
}

impl CalendarEntry<'_> {
    pub fn source_id(&self) -> &str {
        &self.routine.id
    }

    pub fn due_at(&self) -> NaiveDateTime {
        self.occurrence.due_at
    }
}

/// Projects occurrences for a date using default [`ProjectionOptions`].
///
/// See [`CalendarProjector::project_date`].
pub fn project_occurrences_for_date<'a>(
    target: NaiveDate,
    routines: &'a [Routine],
    filters: &FilterSet,
    today: NaiveDate,
) -> Vec<CalendarEntry<'a>> {
    CalendarProjector::default().project_date(target, routines, filters, today)
}

/// CalendarProjector: read-only projection of routines onto calendar dates.
///
/// Responsibilities:
/// 1. Match routines whose stored occurrence falls on the date
/// 2. Project future occurrences of recurring routines by iterating the engine
/// 3. Keep overdue routines pinned to their original due date
/// 4. Order same-day entries for display
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarProjector {
    options: ProjectionOptions,
    engine: RecurrenceEngine,
}

impl CalendarProjector {
    pub fn new(options: ProjectionOptions) -> Self {
        Self {
            options,
            engine: RecurrenceEngine::new(options.engine),
        }
    }

    pub fn options(&self) -> &ProjectionOptions {
        &self.options
    }

    /// Returns the routines occurring on `target`, sorted for display.
    ///
    /// # Arguments
    /// * `target` - Calendar date being rendered
    /// * `routines` - Stored routine records
    /// * `filters` - Active filter bar state, applied before projection
    /// * `today` - The caller's current date; decides what is overdue
    ///
    /// # Behavior
    /// - Only active routines that pass `filters` are considered
    /// - A stored occurrence on `target` is emitted as-is and never also projected
    /// - Projection requires a recurring rule, a stored occurrence that is not
    ///   overdue, and a target after the stored occurrence
    /// - Routines with an unparseable due date are skipped
    pub fn project_date<'a>(
        &self,
        target: NaiveDate,
        routines: &'a [Routine],
        filters: &FilterSet,
        today: NaiveDate,
    ) -> Vec<CalendarEntry<'a>> {
        let mut entries: Vec<CalendarEntry<'a>> = routines
            .iter()
            .filter(|routine| routine.is_active() && filters.matches(routine))
            .filter_map(|routine| self.project_routine(routine, target, today))
            .collect();

        entries.sort_by(display_order);
        entries
    }

    /// Projects every date in `start..=end`. Dates with no entries are omitted.
    pub fn project_range<'a>(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        routines: &'a [Routine],
        filters: &FilterSet,
        today: NaiveDate,
    ) -> BTreeMap<NaiveDate, Vec<CalendarEntry<'a>>> {
        start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter_map(|date| {
                let entries = self.project_date(date, routines, filters, today);
                (!entries.is_empty()).then_some((date, entries))
            })
            .collect()
    }

    fn project_routine<'a>(
        &self,
        routine: &'a Routine,
        target: NaiveDate,
        today: NaiveDate,
    ) -> Option<CalendarEntry<'a>> {
        let stored = match routine.scheduled() {
            Ok(stored) => stored?,
            Err(err) => {
                warn!(routine_id = %routine.id, error = %err, "skipping routine with unparseable due date");
                return None;
            }
        };

        if stored.date() == target {
            return Some(CalendarEntry {
                routine,
                occurrence: stored,
                is_projected: false,
            });
        }

        let rule = routine.rule().filter(|rule| rule.is_recurring())?;
        if stored.date() < today || target < stored.date() {
            return None;
        }

        let zone = routine.zone();
        let mut current = stored;
        for _ in 0..self.options.max_iterations {
            let next = next_scheduled(&current, rule, zone.as_ref(), &self.engine)?;
            match next.date().cmp(&target) {
                Ordering::Less => current = next,
                Ordering::Equal => {
                    return Some(CalendarEntry {
                        routine,
                        occurrence: next,
                        is_projected: true,
                    })
                }
                Ordering::Greater => return None,
            }
        }

        debug!(
            routine_id = %routine.id,
            %target,
            max_iterations = self.options.max_iterations,
            "projection stopped at iteration cap"
        );
        None
    }
}

/// All-day entries first, highest priority first; timed entries after, by time.
fn display_order(a: &CalendarEntry<'_>, b: &CalendarEntry<'_>) -> Ordering {
    let by_priority = || b.routine.priority.cmp(&a.routine.priority);
    let by_title = || a.routine.title.cmp(&b.routine.title);

    match (a.occurrence.all_day, b.occurrence.all_day) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => by_priority().then_with(by_title),
        (false, false) => a
            .due_at()
            .time()
            .cmp(&b.due_at().time())
            .then_with(by_priority)
            .then_with(by_title),
    }
}
