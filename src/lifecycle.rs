//! Appointment state machine.
//!
//! Checks always run in the same order: existence, then capability, then
//! state (then the temporal gate, where one applies). A caller who lacks the
//! capability gets `Forbidden` without learning the appointment's status.

use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use uuid::Uuid;

use crate::completion::{self, ConfirmingParty};
use crate::db::repository;
use crate::error::SchedulingError;
use crate::models::{Actor, Appointment, AppointmentStatus};
use crate::permissions::{can_perform, AppointmentAction};

/// The three single-step status transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    /// Counselor accepts a pending booking.
    Confirm,
    /// Counselor declines a pending booking.
    Reject,
    /// Requester withdraws a pending or confirmed booking.
    Cancel,
}

impl TransitionAction {
    fn capability(&self) -> AppointmentAction {
        match self {
            Self::Confirm => AppointmentAction::Confirm,
            Self::Reject => AppointmentAction::Reject,
            Self::Cancel => AppointmentAction::Cancel,
        }
    }

    fn target(&self) -> AppointmentStatus {
        match self {
            Self::Confirm => AppointmentStatus::Confirmed,
            Self::Reject => AppointmentStatus::Rejected,
            Self::Cancel => AppointmentStatus::Cancelled,
        }
    }

    fn allowed_from(&self, status: &AppointmentStatus) -> bool {
        match self {
            Self::Confirm | Self::Reject => *status == AppointmentStatus::Pending,
            Self::Cancel => matches!(
                status,
                AppointmentStatus::Pending | AppointmentStatus::Confirmed
            ),
        }
    }
}

/// Apply a single-step transition and return the updated appointment.
pub fn transition_appointment(
    conn: &Connection,
    actor: &Actor,
    appointment_id: &Uuid,
    action: TransitionAction,
) -> Result<Appointment, SchedulingError> {
    let appointment = load_appointment(conn, appointment_id)?;

    let capability = action.capability();
    if !can_perform(actor, &appointment, capability) {
        return Err(SchedulingError::Forbidden {
            action: capability.as_str(),
        });
    }
    if !action.allowed_from(&appointment.status) {
        return Err(SchedulingError::InvalidState {
            action: capability.as_str(),
            status: appointment.status.to_string(),
        });
    }

    repository::update_status(conn, appointment_id, action.target())?;
    tracing::info!(
        appointment_id = %appointment_id,
        from = %appointment.status,
        to = %action.target(),
        "Appointment transitioned"
    );
    load_appointment(conn, appointment_id)
}

/// Confirm completion for the calling party, against the wall clock.
pub fn confirm_completion(
    conn: &Connection,
    actor: &Actor,
    appointment_id: &Uuid,
) -> Result<Appointment, SchedulingError> {
    confirm_completion_at(conn, actor, appointment_id, Local::now().naive_local())
}

/// Same as [`confirm_completion`] with an explicit `now`.
///
/// Each party's flag is one-way. When the second flag lands, the appointment
/// moves to `completed` and its consultation record is created — flag, status
/// and record all commit atomically.
pub fn confirm_completion_at(
    conn: &Connection,
    actor: &Actor,
    appointment_id: &Uuid,
    now: NaiveDateTime,
) -> Result<Appointment, SchedulingError> {
    let appointment = load_appointment(conn, appointment_id)?;

    if !can_perform(actor, &appointment, AppointmentAction::ConfirmCompletion) {
        return Err(SchedulingError::Forbidden {
            action: AppointmentAction::ConfirmCompletion.as_str(),
        });
    }
    if !matches!(
        appointment.status,
        AppointmentStatus::Confirmed | AppointmentStatus::Completed
    ) {
        return Err(SchedulingError::InvalidState {
            action: AppointmentAction::ConfirmCompletion.as_str(),
            status: appointment.status.to_string(),
        });
    }

    let ends_at = appointment.effective_end();
    if now < ends_at {
        return Err(SchedulingError::TooEarly { ends_at });
    }

    let confirming = if actor.is_counselor_of(&appointment) {
        ConfirmingParty::Counselor
    } else {
        ConfirmingParty::Requester
    };

    let tx = conn.unchecked_transaction()?;

    match confirming {
        ConfirmingParty::Requester => repository::set_user_confirmed(&tx, appointment_id)?,
        ConfirmingParty::Counselor => repository::set_counselor_confirmed(&tx, appointment_id)?,
    }

    let mut updated = load_appointment(&tx, appointment_id)?;
    if updated.user_confirmed_complete
        && updated.counselor_confirmed_complete
        && updated.status != AppointmentStatus::Completed
    {
        repository::update_status(&tx, appointment_id, AppointmentStatus::Completed)?;
        updated = load_appointment(&tx, appointment_id)?;
        completion::finalize_completion(&tx, &updated, now, confirming)?;
    }
    tx.commit()?;

    Ok(updated)
}

/// Attach or replace the counselor's session summary.
pub fn record_summary(
    conn: &Connection,
    actor: &Actor,
    appointment_id: &Uuid,
    summary: &str,
) -> Result<Appointment, SchedulingError> {
    let appointment = load_appointment(conn, appointment_id)?;

    if !can_perform(actor, &appointment, AppointmentAction::RecordSummary) {
        return Err(SchedulingError::Forbidden {
            action: AppointmentAction::RecordSummary.as_str(),
        });
    }
    if matches!(
        appointment.status,
        AppointmentStatus::Cancelled | AppointmentStatus::Rejected
    ) {
        return Err(SchedulingError::InvalidState {
            action: AppointmentAction::RecordSummary.as_str(),
            status: appointment.status.to_string(),
        });
    }

    repository::set_summary(conn, appointment_id, summary)?;
    load_appointment(conn, appointment_id)
}

/// Rate a completed appointment; re-rating replaces the previous value and
/// the counselor's aggregate is recomputed from scratch either way.
pub fn rate_appointment(
    conn: &Connection,
    actor: &Actor,
    appointment_id: &Uuid,
    rating: i32,
    review: Option<&str>,
) -> Result<Appointment, SchedulingError> {
    let appointment = load_appointment(conn, appointment_id)?;

    if !can_perform(actor, &appointment, AppointmentAction::Rate) {
        return Err(SchedulingError::Forbidden {
            action: AppointmentAction::Rate.as_str(),
        });
    }
    if appointment.status != AppointmentStatus::Completed {
        return Err(SchedulingError::InvalidState {
            action: AppointmentAction::Rate.as_str(),
            status: appointment.status.to_string(),
        });
    }
    if !(1..=5).contains(&rating) {
        return Err(SchedulingError::InvalidInput(
            "rating must be between 1 and 5".into(),
        ));
    }

    let tx = conn.unchecked_transaction()?;
    repository::set_rating(&tx, appointment_id, rating, review)?;
    repository::upsert_rating(
        &tx,
        appointment_id,
        &appointment.user_id,
        &appointment.counselor_id,
        rating,
        review,
    )?;
    repository::update_record_rating(&tx, appointment_id, rating, review)?;
    completion::recompute_rating_aggregate(&tx, &appointment.counselor_id)?;
    tx.commit()?;

    load_appointment(conn, appointment_id)
}

fn load_appointment(conn: &Connection, id: &Uuid) -> Result<Appointment, SchedulingError> {
    repository::get_appointment(conn, id)?
        .ok_or_else(|| SchedulingError::not_found("appointment", id))
}
