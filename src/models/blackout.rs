use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A date range a counselor has marked unbookable, optionally narrowed to a
/// time-of-day sub-range. Absence of both time bounds means the whole day.
///
/// Periods may overlap each other; any active period covering a slot makes
/// it unbookable. Periods are deactivated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackoutPeriod {
    pub id: Uuid,
    pub counselor_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub is_active: bool,
}

impl BlackoutPeriod {
    pub fn is_all_day(&self) -> bool {
        self.start_time.is_none() || self.end_time.is_none()
    }

    /// Whether a slot starting at `slot_start` falls inside this period.
    /// Date containment is the caller's concern; this checks time of day only.
    pub fn covers_slot(&self, slot_start: NaiveTime) -> bool {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => start <= slot_start && slot_start < end,
            _ => true,
        }
    }
}

/// Input shape for creating or editing a blackout period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlackout {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
}
