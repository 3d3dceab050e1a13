use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AppointmentStatus, ConsultMethod};
use crate::config;

/// The central entity: one appointment per booked slot.
///
/// `end_at` is an explicit nullable column; when absent the appointment
/// occupies exactly the default slot duration. The two confirmation flags are
/// one-way — each settable only by its owner, only after the effective end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    /// Requester (the booking user).
    pub user_id: Uuid,
    pub counselor_id: Uuid,
    pub consult_type: Option<String>,
    pub consult_method: ConsultMethod,
    pub start_at: NaiveDateTime,
    pub end_at: Option<NaiveDateTime>,
    /// Free-text purpose supplied by the requester.
    pub description: Option<String>,
    pub status: AppointmentStatus,
    /// Counselor's free-text summary.
    pub summary: Option<String>,
    /// Requester rating, 1-5, only after completion.
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub user_confirmed_complete: bool,
    pub counselor_confirmed_complete: bool,
}

impl Appointment {
    /// Explicit end if stored, otherwise start plus the default duration.
    pub fn effective_end(&self) -> NaiveDateTime {
        self.end_at
            .unwrap_or(self.start_at + Duration::minutes(config::SLOT_MINUTES))
    }

    /// Half-open interval overlap against `[start, end)`.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        !(end <= self.start_at || start >= self.effective_end())
    }
}
