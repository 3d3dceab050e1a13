//! Completion side effects: the one-time consultation record and the
//! counselor aggregates derived from it.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::error::SchedulingError;
use crate::models::{Appointment, ConsultationRecord};

/// Which side's confirmation is landing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmingParty {
    Requester,
    Counselor,
}

/// Create the consultation record and refresh the counselor's completion
/// count. Idempotent: a second call for the same appointment is a no-op, and
/// the snapshot's UNIQUE constraint backstops any race this guard misses.
///
/// The side confirming now is stamped with `now`; the side that confirmed
/// earlier is stamped with the appointment's effective end.
pub fn finalize_completion(
    conn: &Connection,
    appointment: &Appointment,
    now: NaiveDateTime,
    confirming: ConfirmingParty,
) -> Result<(), SchedulingError> {
    if repository::record_exists_for_appointment(conn, &appointment.id)? {
        return Ok(());
    }

    let ends_at = appointment.effective_end();
    let (user_confirmed_at, counselor_confirmed_at) = match confirming {
        ConfirmingParty::Requester => (now, ends_at),
        ConfirmingParty::Counselor => (ends_at, now),
    };

    let record = ConsultationRecord {
        id: Uuid::new_v4(),
        appointment_id: appointment.id,
        user_id: appointment.user_id,
        counselor_id: appointment.counselor_id,
        consult_type: appointment.consult_type.clone(),
        consult_method: appointment.consult_method.clone(),
        start_at: appointment.start_at,
        end_at: appointment.end_at,
        description: appointment.description.clone(),
        summary: appointment.summary.clone(),
        rating: appointment.rating,
        review: appointment.review.clone(),
        user_confirmed_at,
        counselor_confirmed_at,
    };
    repository::insert_record(conn, &record)?;
    recompute_total_consultations(conn, &appointment.counselor_id)?;

    tracing::info!(
        appointment_id = %appointment.id,
        counselor_id = %appointment.counselor_id,
        "Consultation record created"
    );
    Ok(())
}

/// Overwrite `total_consultations` with a fresh count of records.
pub fn recompute_total_consultations(
    conn: &Connection,
    counselor_id: &Uuid,
) -> Result<(), SchedulingError> {
    let total = repository::count_records_for_counselor(conn, counselor_id)?;
    repository::update_total_consultations(conn, counselor_id, total)?;
    Ok(())
}

/// Overwrite the rating aggregate with values recomputed from all source
/// rows; never incremented in place.
pub fn recompute_rating_aggregate(
    conn: &Connection,
    counselor_id: &Uuid,
) -> Result<(), SchedulingError> {
    let (average, count) = repository::rating_aggregate(conn, counselor_id)?;
    repository::update_rating_aggregate(conn, counselor_id, average, count)?;
    Ok(())
}
