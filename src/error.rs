//! Domain error taxonomy for the scheduling engine.
//!
//! Every failed operation surfaces one of these before anything is written;
//! storage-level failures are kept distinct so callers can apply their own
//! retry policy (the engine never retries).

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("cannot {action} an appointment in status '{status}'")]
    InvalidState {
        action: &'static str,
        status: String,
    },

    #[error("actor is not permitted to {action}")]
    Forbidden { action: &'static str },

    #[error("schedule conflict: {0}")]
    ScheduleConflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("appointment has not ended yet (ends at {ends_at})")]
    TooEarly { ends_at: NaiveDateTime },

    #[error("storage failure: {0}")]
    Storage(#[from] DatabaseError),
}

impl SchedulingError {
    /// Stable machine-readable reason code, independent of the message text.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidState { .. } => "invalid_state",
            Self::Forbidden { .. } => "forbidden",
            Self::ScheduleConflict(_) => "schedule_conflict",
            Self::InvalidInput(_) => "invalid_input",
            Self::TooEarly { .. } => "too_early",
            Self::Storage(_) => "storage",
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for SchedulingError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(DatabaseError::from(e))
    }
}
