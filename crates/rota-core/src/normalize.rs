//! Boundary mapping from the legacy `frequency` field to [`RecurrenceRule`].
//!
//! Older routine records carry a free-text `frequency` ("weekly",
//! "quarterly", ...) instead of a structured `recurrence` object. Records are
//! normalized once when they enter the system; the engine only ever sees the
//! canonical rule.

use tracing::debug;

use crate::models::{RecurrenceRule, RecurrenceType, Routine};

/// Maps a legacy frequency string onto a rule. Unrecognised values map to a
/// non-recurring rule.
pub fn rule_from_frequency(frequency: &str) -> RecurrenceRule {
    let normalized = frequency.trim().to_lowercase().replace(|c: char| c == '_' || c == ' ', "-");
    let (kind, interval) = match normalized.as_str() {
        "daily" => (RecurrenceType::Daily, 1),
        "weekly" => (RecurrenceType::Weekly, 1),
        "biweekly" | "bi-weekly" | "fortnightly" => (RecurrenceType::Weekly, 2),
        "monthly" => (RecurrenceType::Monthly, 1),
        "quarterly" => (RecurrenceType::Monthly, 3),
        "semiannually" | "semi-annually" | "biannually" => (RecurrenceType::Monthly, 6),
        "annually" | "yearly" => (RecurrenceType::Monthly, 12),
        _ => (RecurrenceType::None, 1),
    };

    RecurrenceRule {
        kind,
        interval,
        ..RecurrenceRule::default()
    }
}

/// Fills `recurrence` from `frequency` when the structured rule is absent and
/// drops the legacy field. A structured rule always wins.
pub fn normalize_routine(mut routine: Routine) -> Routine {
    if let Some(frequency) = routine.frequency.take() {
        if routine.recurrence.is_none() {
            let rule = rule_from_frequency(&frequency);
            debug!(routine_id = %routine.id, %frequency, kind = %rule.kind, "migrated legacy frequency");
            routine.recurrence = Some(rule);
        }
    }
    routine
}

/// True when the record still uses the legacy field.
pub fn needs_normalization(routine: &Routine) -> bool {
    routine.frequency.is_some()
}
