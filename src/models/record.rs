use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ConsultMethod;

/// Immutable snapshot of a completed appointment, created exactly once at the
/// `completed` transition. The only post-creation writes it ever receives are
/// mirrors of late rating/review edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationRecord {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub user_id: Uuid,
    pub counselor_id: Uuid,
    pub consult_type: Option<String>,
    pub consult_method: ConsultMethod,
    pub start_at: NaiveDateTime,
    pub end_at: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub user_confirmed_at: NaiveDateTime,
    pub counselor_confirmed_at: NaiveDateTime,
}
