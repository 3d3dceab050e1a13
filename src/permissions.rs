//! Capability checks for appointment actions.
//!
//! Every state-changing entry point funnels through [`can_perform`] before
//! touching storage, so the ownership rules live in exactly one place.

use crate::models::{Actor, ActorRole, Appointment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    Confirm,
    Reject,
    Cancel,
    ConfirmCompletion,
    RecordSummary,
    Rate,
    View,
}

impl AppointmentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::ConfirmCompletion => "confirm_completion",
            Self::RecordSummary => "record_summary",
            Self::Rate => "rate",
            Self::View => "view",
        }
    }
}

/// Whether `actor` may perform `action` on `appointment`.
///
/// Ownership only — state checks happen after this one, so a denied caller
/// learns nothing about the appointment's current status.
pub fn can_perform(actor: &Actor, appointment: &Appointment, action: AppointmentAction) -> bool {
    match action {
        AppointmentAction::Confirm
        | AppointmentAction::Reject
        | AppointmentAction::RecordSummary => actor.is_counselor_of(appointment),
        AppointmentAction::Cancel | AppointmentAction::Rate => actor.is_requester_of(appointment),
        AppointmentAction::ConfirmCompletion => {
            actor.is_requester_of(appointment) || actor.is_counselor_of(appointment)
        }
        AppointmentAction::View => {
            actor.is_requester_of(appointment)
                || actor.is_counselor_of(appointment)
                || actor.role == ActorRole::Admin
        }
    }
}
