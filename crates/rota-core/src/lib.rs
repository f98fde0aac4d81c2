//! # Rota Core Library
//!
//! Recurrence engine and calendar projection for recurring operational
//! routines: checklists, inspections and audits that repeat on a schedule.
//!
//! ## Features
//!
//! - **Deterministic Recurrence**: Pure next-occurrence calculation for daily,
//!   weekly (with weekday sets) and monthly rules, preserving time of day
//! - **Calendar Projection**: Read-only projection of future occurrences onto
//!   calendar dates, with overdue routines pinned to their original date
//! - **Legacy Normalization**: One boundary mapping from free-text
//!   frequencies to structured rules
//! - **Timezone Awareness**: Wall-clock recurrence for UTC-stored instants
//!   with DST handling
//!
//! ## Core Modules
//!
//! - [`models`]: Routine records, recurrence rules and filters
//! - [`recurrence`]: The recurrence engine
//! - [`calendar`]: Calendar occurrence projector
//! - [`completion`]: Completion handling (reschedule or terminate)
//! - [`normalize`]: Legacy `frequency` normalization
//! - [`timezone`]: Timezone utilities and validation
//! - [`store`]: JSON file persistence for the command-line front end
//! - [`error`]: Error types for boundary operations
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rota_core::models::RecurrenceRule;
//! use rota_core::recurrence::compute_next_occurrence;
//!
//! let due = NaiveDate::from_ymd_opt(2024, 3, 6)
//!     .unwrap()
//!     .and_hms_opt(9, 0, 0)
//!     .unwrap();
//! // Mondays, Wednesdays and Fridays.
//! let rule = RecurrenceRule::weekly(1, vec![1, 3, 5]);
//!
//! let next = compute_next_occurrence(Some(due), &rule).unwrap();
//! assert_eq!(next.to_string(), "2024-03-08 09:00:00");
//! ```

pub mod calendar;
pub mod completion;
pub mod error;
pub mod models;
pub mod normalize;
pub mod recurrence;
pub mod store;
pub mod timezone;

pub use calendar::{project_occurrences_for_date, CalendarEntry, CalendarProjector, ProjectionOptions};
pub use completion::{apply_completion, complete_routine};
pub use error::CoreError;
pub use models::{
    CompletionOutcome, FilterSet, RecurrenceRule, RecurrenceType, Routine, RoutinePriority,
    RoutineStatus, ScheduledOccurrence,
};
pub use recurrence::{compute_next_occurrence, EngineOptions, MonthOverflow, RecurrenceEngine, WeekStart};
