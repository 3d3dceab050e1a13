use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::appointment::Appointment;
use super::enums::ActorRole;

/// Authenticated caller identity, supplied by the identity collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: ActorRole,
    /// Resolved counselor profile id; present for counselor actors.
    pub counselor_id: Option<Uuid>,
}

impl Actor {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: ActorRole::User,
            counselor_id: None,
        }
    }

    pub fn counselor(user_id: Uuid, counselor_id: Uuid) -> Self {
        Self {
            user_id,
            role: ActorRole::Counselor,
            counselor_id: Some(counselor_id),
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: ActorRole::Admin,
            counselor_id: None,
        }
    }

    pub fn is_requester_of(&self, appointment: &Appointment) -> bool {
        self.user_id == appointment.user_id
    }

    pub fn is_counselor_of(&self, appointment: &Appointment) -> bool {
        self.counselor_id == Some(appointment.counselor_id)
    }
}
