use tracing::info;

use crate::error::CoreError;
use crate::models::{CompletionOutcome, RecurrenceRule, Routine, RoutineStatus};
use crate::recurrence::RecurrenceEngine;
use crate::timezone::next_scheduled;

/// Decides what happens to a routine when its current instance is completed.
///
/// Only active routines can be completed. Calls the engine exactly once. A
/// routine without a recurring rule, or whose rule has run past its end
/// date, terminates. Timed values with an offset step on the routine's own
/// timezone when it has one.
pub fn complete_routine(
    routine: &Routine,
    engine: &RecurrenceEngine,
) -> Result<CompletionOutcome, CoreError> {
    if !routine.is_active() {
        return Err(CoreError::NotActive(routine.id.clone(), routine.status));
    }
    let previous = routine
        .scheduled()?
        .ok_or_else(|| CoreError::MissingDueDate(routine.id.clone()))?;
    let rule = routine.rule().cloned().unwrap_or_else(RecurrenceRule::none);
    let zone = routine.zone();

    Ok(match next_scheduled(&previous, &rule, zone.as_ref(), engine) {
        Some(next) => CompletionOutcome::Rescheduled { previous, next },
        None => CompletionOutcome::Terminated { previous },
    })
}

/// Writes a completion outcome back onto the routine record.
pub fn apply_completion(routine: &mut Routine, outcome: &CompletionOutcome) {
    match outcome {
        CompletionOutcome::Rescheduled { next, .. } => {
            routine.due_date = Some(next.to_stored());
            info!(routine_id = %routine.id, next_due = %next.due_at, "routine rescheduled");
        }
        CompletionOutcome::Terminated { .. } => {
            routine.status = RoutineStatus::Terminated;
            info!(routine_id = %routine.id, "routine terminated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn routine(due: &str, rule: Option<RecurrenceRule>) -> Routine {
        let mut routine = Routine::new("r1", "Ladder inspection");
        routine.due_date = Some(due.to_string());
        routine.recurrence = rule;
        routine
    }

    #[test]
    fn test_recurring_routine_is_rescheduled() {
        let mut routine = routine("2024-03-01T09:00:00", Some(RecurrenceRule::daily(1)));
        let outcome = complete_routine(&routine, &RecurrenceEngine::default()).unwrap();

        match &outcome {
            CompletionOutcome::Rescheduled { previous, next } => {
                assert_eq!(previous.due_at.to_string(), "2024-03-01 09:00:00");
                assert_eq!(next.due_at.to_string(), "2024-03-02 09:00:00");
            }
            other => panic!("Expected reschedule, got {other:?}"),
        }

        apply_completion(&mut routine, &outcome);
        assert_eq!(routine.due_date.as_deref(), Some("2024-03-02T09:00:00"));
        assert_eq!(routine.status, RoutineStatus::Active);
    }

    #[test]
    fn test_reschedule_keeps_stored_shape() {
        let mut all_day = routine("2024-03-01", Some(RecurrenceRule::weekly(1, vec![])));
        let outcome = complete_routine(&all_day, &RecurrenceEngine::default()).unwrap();
        apply_completion(&mut all_day, &outcome);
        assert_eq!(all_day.due_date.as_deref(), Some("2024-03-08"));

        let mut zoned = routine("2024-03-01T09:00:00+01:00", Some(RecurrenceRule::monthly(1, None)));
        let outcome = complete_routine(&zoned, &RecurrenceEngine::default()).unwrap();
        apply_completion(&mut zoned, &outcome);
        assert_eq!(zoned.due_date.as_deref(), Some("2024-04-01T09:00:00+01:00"));
    }

    #[test]
    fn test_ended_rule_terminates() {
        let rule = RecurrenceRule::daily(1).until(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let mut routine = routine("2024-03-01", Some(rule));
        let outcome = complete_routine(&routine, &RecurrenceEngine::default()).unwrap();
        assert!(matches!(outcome, CompletionOutcome::Terminated { .. }));

        apply_completion(&mut routine, &outcome);
        assert_eq!(routine.status, RoutineStatus::Terminated);
        assert_eq!(routine.due_date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn test_one_off_routine_terminates() {
        let routine = routine("2024-03-01", None);
        let outcome = complete_routine(&routine, &RecurrenceEngine::default()).unwrap();
        assert!(matches!(outcome, CompletionOutcome::Terminated { .. }));
    }

    #[rstest]
    #[case(RoutineStatus::Terminated)]
    #[case(RoutineStatus::Paused)]
    fn test_inactive_routine_cannot_be_completed(#[case] status: RoutineStatus) {
        let mut routine = routine("2024-03-01", Some(RecurrenceRule::daily(1)));
        routine.status = status;

        let err = complete_routine(&routine, &RecurrenceEngine::default()).unwrap_err();
        assert!(matches!(err, CoreError::NotActive(ref id, s) if id == "r1" && s == status));
        assert!(err.to_string().contains("only active routines"), "{err}");
        assert_eq!(routine.due_date.as_deref(), Some("2024-03-01"));
        assert_eq!(routine.status, status);
    }

    #[test]
    fn test_reschedule_uses_routine_timezone() {
        let mut zoned = routine("2024-03-09T14:00:00Z", Some(RecurrenceRule::daily(1)));
        zoned.timezone = Some("America/New_York".to_string());
        let outcome = complete_routine(&zoned, &RecurrenceEngine::default()).unwrap();
        apply_completion(&mut zoned, &outcome);
        // Still 09:00 in New York after clocks spring forward.
        assert_eq!(zoned.due_date.as_deref(), Some("2024-03-10T13:00:00Z"));

        let mut unknown = routine("2024-03-09T14:00:00Z", Some(RecurrenceRule::daily(1)));
        unknown.timezone = Some("Mars/Olympus".to_string());
        let outcome = complete_routine(&unknown, &RecurrenceEngine::default()).unwrap();
        apply_completion(&mut unknown, &outcome);
        assert_eq!(unknown.due_date.as_deref(), Some("2024-03-10T14:00:00Z"));
    }

    #[test]
    fn test_missing_or_corrupt_due_date_is_an_error() {
        let mut routine = Routine::new("r1", "Ladder inspection");
        assert!(matches!(
            complete_routine(&routine, &RecurrenceEngine::default()),
            Err(CoreError::MissingDueDate(_))
        ));

        routine.due_date = Some("yesterday-ish".to_string());
        assert!(matches!(
            complete_routine(&routine, &RecurrenceEngine::default()),
            Err(CoreError::InvalidDueDate(_))
        ));
    }
}
