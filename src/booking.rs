//! Appointment creation: the ordered conflict checks and the initial insert.
//!
//! All checks and the insert run inside one transaction so a request either
//! passes every gate and lands as `pending`, or leaves no trace.

use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::availability;
use crate::config;
use crate::db::repository;
use crate::error::SchedulingError;
use crate::models::{Actor, Appointment, AppointmentStatus, ConsultMethod};

/// Markers that make a booking description unacceptable. Matched
/// case-insensitively as substrings.
const DISALLOWED_CONTENT_MARKERS: &[&str] =
    &["violence", "illegal", "crime", "suicide", "self-harm"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub counselor_id: Uuid,
    pub consult_type: Option<String>,
    pub consult_method: ConsultMethod,
    pub start_at: NaiveDateTime,
    /// Explicit end; absent means one default slot.
    pub end_at: Option<NaiveDateTime>,
    pub description: Option<String>,
}

impl BookingRequest {
    fn effective_end(&self) -> NaiveDateTime {
        self.end_at
            .unwrap_or(self.start_at + chrono::Duration::minutes(config::SLOT_MINUTES))
    }
}

/// Book an appointment for `actor` against the wall clock.
pub fn create_appointment(
    conn: &Connection,
    actor: &Actor,
    request: &BookingRequest,
) -> Result<Appointment, SchedulingError> {
    create_appointment_at(conn, actor, request, Local::now().naive_local())
}

/// Same as [`create_appointment`] with an explicit `now`.
pub fn create_appointment_at(
    conn: &Connection,
    actor: &Actor,
    request: &BookingRequest,
    now: NaiveDateTime,
) -> Result<Appointment, SchedulingError> {
    let tx = conn.unchecked_transaction()?;

    repository::get_counselor(&tx, &request.counselor_id)?
        .filter(|c| c.is_bookable())
        .ok_or_else(|| SchedulingError::not_found("counselor", request.counselor_id))?;

    if request.start_at < now {
        return Err(SchedulingError::InvalidInput(
            "appointment start is in the past".into(),
        ));
    }

    let end = request.effective_end();
    if let Some(explicit_end) = request.end_at {
        if explicit_end <= request.start_at {
            return Err(SchedulingError::InvalidInput(
                "appointment end must be after its start".into(),
            ));
        }
        let duration = (explicit_end - request.start_at).num_minutes();
        if !(config::MIN_DURATION_MINUTES..=config::MAX_DURATION_MINUTES).contains(&duration) {
            return Err(SchedulingError::InvalidInput(format!(
                "appointment duration must be between {} and {} minutes",
                config::MIN_DURATION_MINUTES,
                config::MAX_DURATION_MINUTES
            )));
        }
    }

    // Counselor-side overlap. Existing bookings with the exact same window are
    // skipped here: they share the slot and are governed by its capacity,
    // which the availability check below enforces.
    let counselor_busy = repository::list_active_for_counselor(&tx, &request.counselor_id)?;
    if counselor_busy
        .iter()
        .filter(|a| !(a.start_at == request.start_at && a.effective_end() == end))
        .any(|a| a.overlaps(request.start_at, end))
    {
        return Err(SchedulingError::ScheduleConflict(
            "counselor already has an appointment in this window".into(),
        ));
    }

    // Requester-side overlap has no same-window carve-out: one person cannot
    // attend two sessions at once.
    let requester_busy = repository::list_active_for_user(&tx, &actor.user_id)?;
    if requester_busy
        .iter()
        .any(|a| a.overlaps(request.start_at, end))
    {
        return Err(SchedulingError::ScheduleConflict(
            "you already have an appointment in this window".into(),
        ));
    }

    // The requested start must be one of the slots the counselor currently
    // offers (template window, blackouts, capacity, booking horizon).
    let slots = availability::list_available_slots_on(
        &tx,
        &request.counselor_id,
        request.start_at.date(),
        now.date(),
    )?;
    if !slots.iter().any(|s| s.start == request.start_at.time()) {
        return Err(SchedulingError::ScheduleConflict(
            "requested slot is not available".into(),
        ));
    }

    if let Some(description) = &request.description {
        let lowered = description.to_lowercase();
        if DISALLOWED_CONTENT_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Err(SchedulingError::InvalidInput(
                "description contains disallowed content".into(),
            ));
        }
    }

    let appointment = Appointment {
        id: Uuid::new_v4(),
        user_id: actor.user_id,
        counselor_id: request.counselor_id,
        consult_type: request.consult_type.clone(),
        consult_method: request.consult_method.clone(),
        start_at: request.start_at,
        end_at: request.end_at,
        description: request.description.clone(),
        status: AppointmentStatus::Pending,
        summary: None,
        rating: None,
        review: None,
        user_confirmed_complete: false,
        counselor_confirmed_complete: false,
    };
    repository::insert_appointment(&tx, &appointment)?;
    tx.commit()?;

    tracing::info!(
        appointment_id = %appointment.id,
        counselor_id = %appointment.counselor_id,
        start_at = %appointment.start_at,
        "Appointment booked"
    );
    Ok(appointment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::models::{Counselor, CounselorStatus, NewBlackout, ScheduleEntry};
    use chrono::{NaiveDate, NaiveTime};

    // 2026-03-02 is a Monday.
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap()
    }

    fn dt(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn seed_counselor(conn: &Connection, status: CounselorStatus) -> Uuid {
        let counselor = Counselor {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            real_name: "Dr. Wen".into(),
            specialty: None,
            status,
            total_consultations: 0,
            average_rating: 0.0,
            review_count: 0,
        };
        repository::insert_counselor(conn, &counselor).unwrap();
        counselor.id
    }

    fn request(counselor_id: Uuid, start_at: NaiveDateTime) -> BookingRequest {
        BookingRequest {
            counselor_id,
            consult_type: Some("individual".into()),
            consult_method: ConsultMethod::Video,
            start_at,
            end_at: None,
            description: Some("First session".into()),
        }
    }

    #[test]
    fn successful_booking_lands_as_pending() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        let actor = Actor::user(Uuid::new_v4());

        let appointment =
            create_appointment_at(&conn, &actor, &request(counselor_id, dt(2, 9, 0)), now())
                .unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.user_id, actor.user_id);

        let loaded = repository::get_appointment(&conn, &appointment.id)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.start_at, dt(2, 9, 0));
    }

    #[test]
    fn inactive_counselor_is_not_found() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Pending);
        let actor = Actor::user(Uuid::new_v4());

        let result =
            create_appointment_at(&conn, &actor, &request(counselor_id, dt(2, 9, 0)), now());
        assert!(matches!(result, Err(SchedulingError::NotFound { .. })));
    }

    #[test]
    fn past_start_rejected() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        let actor = Actor::user(Uuid::new_v4());

        let result =
            create_appointment_at(&conn, &actor, &request(counselor_id, dt(2, 6, 0)), now());
        assert!(matches!(result, Err(SchedulingError::InvalidInput(_))));
    }

    #[test]
    fn duration_bounds_enforced() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        let actor = Actor::user(Uuid::new_v4());

        let mut too_short = request(counselor_id, dt(2, 9, 0));
        too_short.end_at = Some(dt(2, 9, 30));
        assert!(matches!(
            create_appointment_at(&conn, &actor, &too_short, now()),
            Err(SchedulingError::InvalidInput(_))
        ));

        let mut too_long = request(counselor_id, dt(2, 9, 0));
        too_long.end_at = Some(dt(2, 12, 30));
        assert!(matches!(
            create_appointment_at(&conn, &actor, &too_long, now()),
            Err(SchedulingError::InvalidInput(_))
        ));

        let mut inverted = request(counselor_id, dt(2, 9, 0));
        inverted.end_at = Some(dt(2, 8, 0));
        assert!(matches!(
            create_appointment_at(&conn, &actor, &inverted, now()),
            Err(SchedulingError::InvalidInput(_))
        ));

        let mut three_hours = request(counselor_id, dt(2, 9, 0));
        three_hours.end_at = Some(dt(2, 12, 0));
        assert!(create_appointment_at(&conn, &actor, &three_hours, now()).is_ok());
    }

    #[test]
    fn counselor_overlap_rejected() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);

        let mut long = request(counselor_id, dt(2, 9, 0));
        long.end_at = Some(dt(2, 11, 0));
        create_appointment_at(&conn, &Actor::user(Uuid::new_v4()), &long, now()).unwrap();

        // A different user asking for 10:00 collides with the 09:00-11:00 booking.
        let result = create_appointment_at(
            &conn,
            &Actor::user(Uuid::new_v4()),
            &request(counselor_id, dt(2, 10, 0)),
            now(),
        );
        assert!(matches!(result, Err(SchedulingError::ScheduleConflict(_))));
    }

    #[test]
    fn requester_cannot_double_book_themselves() {
        let conn = open_memory_database().unwrap();
        let counselor_a = seed_counselor(&conn, CounselorStatus::Active);
        let counselor_b = seed_counselor(&conn, CounselorStatus::Active);
        let actor = Actor::user(Uuid::new_v4());

        create_appointment_at(&conn, &actor, &request(counselor_a, dt(2, 9, 0)), now()).unwrap();
        let result =
            create_appointment_at(&conn, &actor, &request(counselor_b, dt(2, 9, 0)), now());
        assert!(matches!(result, Err(SchedulingError::ScheduleConflict(_))));

        // An adjacent hour is fine.
        assert!(
            create_appointment_at(&conn, &actor, &request(counselor_b, dt(2, 10, 0)), now())
                .is_ok()
        );
    }

    #[test]
    fn capacity_two_admits_two_then_rejects_third() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        repository::upsert_schedule(
            &conn,
            &counselor_id,
            &ScheduleEntry {
                weekday: 1,
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                max_per_slot: 2,
                is_available: true,
            },
        )
        .unwrap();

        for _ in 0..2 {
            create_appointment_at(
                &conn,
                &Actor::user(Uuid::new_v4()),
                &request(counselor_id, dt(2, 9, 0)),
                now(),
            )
            .unwrap();
        }
        let result = create_appointment_at(
            &conn,
            &Actor::user(Uuid::new_v4()),
            &request(counselor_id, dt(2, 9, 0)),
            now(),
        );
        assert!(matches!(result, Err(SchedulingError::ScheduleConflict(_))));
    }

    #[test]
    fn blackout_blocks_booking() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        repository::insert_blackout(
            &conn,
            &counselor_id,
            &NewBlackout {
                start_date: dt(2, 0, 0).date(),
                end_date: dt(2, 0, 0).date(),
                start_time: Some(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
                end_time: Some(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
                reason: None,
            },
        )
        .unwrap();

        let result = create_appointment_at(
            &conn,
            &Actor::user(Uuid::new_v4()),
            &request(counselor_id, dt(2, 9, 0)),
            now(),
        );
        assert!(matches!(result, Err(SchedulingError::ScheduleConflict(_))));
    }

    #[test]
    fn off_grid_start_rejected() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);

        let result = create_appointment_at(
            &conn,
            &Actor::user(Uuid::new_v4()),
            &request(counselor_id, dt(2, 9, 30)),
            now(),
        );
        assert!(matches!(result, Err(SchedulingError::ScheduleConflict(_))));
    }

    #[test]
    fn disallowed_description_rejected() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);

        let mut bad = request(counselor_id, dt(2, 9, 0));
        bad.description = Some("Planning something ILLEGAL".into());
        let result = create_appointment_at(&conn, &Actor::user(Uuid::new_v4()), &bad, now());
        assert!(matches!(result, Err(SchedulingError::InvalidInput(_))));
    }

    #[test]
    fn failed_booking_writes_nothing() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        let actor = Actor::user(Uuid::new_v4());

        let mut bad = request(counselor_id, dt(2, 9, 0));
        bad.description = Some("thoughts of self-harm".into());
        assert!(create_appointment_at(&conn, &actor, &bad, now()).is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM appointments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
