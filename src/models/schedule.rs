use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Weekly availability template row — at most one per (counselor, weekday).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub id: Uuid,
    pub counselor_id: Uuid,
    /// 1 = Monday .. 7 = Sunday.
    pub weekday: u32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Max simultaneous bookings per slot within this window.
    pub max_per_slot: u32,
    pub is_available: bool,
}

/// Input shape for wholesale replacement or per-weekday upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub weekday: u32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_per_slot: u32,
    pub is_available: bool,
}
