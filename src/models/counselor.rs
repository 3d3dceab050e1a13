use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::CounselorStatus;

/// Counselor profile. Only `active` counselors are bookable.
///
/// `total_consultations`, `average_rating` and `review_count` are derived
/// aggregates, recomputed wholesale from source rows whenever a completion
/// or rating lands — never incremented in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counselor {
    pub id: Uuid,
    /// The identity collaborator's actor id behind this profile.
    pub user_id: Uuid,
    pub real_name: String,
    pub specialty: Option<String>,
    pub status: CounselorStatus,
    pub total_consultations: i64,
    pub average_rating: f64,
    pub review_count: i64,
}

impl Counselor {
    pub fn is_bookable(&self) -> bool {
        self.status == CounselorStatus::Active
    }
}
