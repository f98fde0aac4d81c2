use thiserror::Error;

use crate::models::RoutineStatus;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Malformed routine data")]
    Json(#[from] serde_json::Error),

    #[error("Routine not found: {0}")]
    NotFound(String),

    #[error("Ambiguous routine ID. Did you mean one of these?")]
    AmbiguousId(Vec<(String, String)>), // Vec of (ID, Title)

    #[error("Invalid due date '{0}'")]
    InvalidDueDate(String),

    #[error("Routine '{0}' has no due date")]
    MissingDueDate(String),

    #[error("Routine '{0}' is {1}; only active routines can be completed")]
    NotActive(String, RoutineStatus),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}
