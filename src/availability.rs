//! Bookable-slot calculation.
//!
//! A day's slots come from the counselor's weekly template (falling back to
//! the default window when no enabled row exists for that weekday), minus
//! active blackout coverage, minus slots already at capacity.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::db::repository;
use crate::error::SchedulingError;

/// One bookable slot on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: NaiveTime,
    /// Display label, e.g. `"09:00-10:00"`.
    pub label: String,
}

/// Bookable slots for a counselor on a date, evaluated against today's date.
pub fn list_available_slots(
    conn: &Connection,
    counselor_id: &Uuid,
    date: NaiveDate,
) -> Result<Vec<Slot>, SchedulingError> {
    list_available_slots_on(conn, counselor_id, date, Local::now().date_naive())
}

/// Same as [`list_available_slots`] with an explicit `today`.
pub fn list_available_slots_on(
    conn: &Connection,
    counselor_id: &Uuid,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<Vec<Slot>, SchedulingError> {
    let counselor = repository::get_counselor(conn, counselor_id)?
        .filter(|c| c.is_bookable())
        .ok_or_else(|| SchedulingError::not_found("counselor", counselor_id))?;

    if date < today {
        return Err(SchedulingError::InvalidInput(
            "cannot query availability for a past date".into(),
        ));
    }
    if date > today + Duration::days(config::BOOKING_HORIZON_DAYS) {
        return Err(SchedulingError::InvalidInput(format!(
            "date is beyond the {}-day booking horizon",
            config::BOOKING_HORIZON_DAYS
        )));
    }

    let weekday = date.weekday().number_from_monday();
    let template = repository::get_enabled_schedule(conn, &counselor.id, weekday)?;
    let (window_start, window_end, capacity) = match &template {
        Some(t) => (t.start_time, t.end_time, t.max_per_slot),
        None => (
            config::default_day_start(),
            config::default_day_end(),
            config::DEFAULT_SLOT_CAPACITY,
        ),
    };

    let blackouts = repository::active_blackouts_on(conn, &counselor.id, date)?;
    if blackouts.iter().any(|b| b.is_all_day()) {
        return Ok(Vec::new());
    }

    // Work in minutes past midnight so a window ending at midnight still
    // yields a well-formed "23:00-24:00" label.
    let start_min = minute_of_day(window_start);
    let end_min = minute_of_day(window_end);

    let mut slots = Vec::new();
    let mut cur = start_min;
    while cur + config::SLOT_MINUTES as u32 <= end_min {
        let slot_end = cur + config::SLOT_MINUTES as u32;
        let slot_start = NaiveTime::from_hms_opt(cur / 60, cur % 60, 0)
            .ok_or_else(|| SchedulingError::InvalidInput("malformed schedule window".into()))?;

        let blacked_out = blackouts.iter().any(|b| b.covers_slot(slot_start));
        if !blacked_out {
            let booked =
                repository::count_active_at_slot(conn, &counselor.id, date.and_time(slot_start))?;
            if booked < capacity as i64 {
                slots.push(Slot {
                    start: slot_start,
                    label: format!(
                        "{:02}:{:02}-{:02}:{:02}",
                        cur / 60,
                        cur % 60,
                        slot_end / 60,
                        slot_end % 60
                    ),
                });
            }
        }
        cur = slot_end;
    }

    tracing::debug!(
        counselor_id = %counselor.id,
        %date,
        available = slots.len(),
        "Computed availability"
    );
    Ok(slots)
}

fn minute_of_day(t: NaiveTime) -> u32 {
    use chrono::Timelike;
    t.hour() * 60 + t.minute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::models::{
        Appointment, AppointmentStatus, ConsultMethod, Counselor, CounselorStatus, NewBlackout,
        ScheduleEntry,
    };

    // 2026-03-02 is a Monday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
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

    fn book(conn: &Connection, counselor_id: Uuid, h: u32, status: AppointmentStatus) -> Uuid {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            counselor_id,
            consult_type: None,
            consult_method: ConsultMethod::Video,
            start_at: today().and_time(time(h, 0)),
            end_at: None,
            description: None,
            status,
            summary: None,
            rating: None,
            review: None,
            user_confirmed_complete: false,
            counselor_confirmed_complete: false,
        };
        repository::insert_appointment(conn, &appointment).unwrap();
        appointment.id
    }

    #[test]
    fn default_window_yields_fourteen_slots() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);

        let slots = list_available_slots_on(&conn, &counselor_id, today(), today()).unwrap();
        assert_eq!(slots.len(), 14);
        assert_eq!(slots[0].start, time(8, 0));
        assert_eq!(slots[0].label, "08:00-09:00");
        assert_eq!(slots[13].label, "21:00-22:00");
        // Ascending order.
        assert!(slots.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn template_window_overrides_default() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        repository::upsert_schedule(
            &conn,
            &counselor_id,
            &ScheduleEntry {
                weekday: 1,
                start_time: time(9, 0),
                end_time: time(12, 30),
                max_per_slot: 1,
                is_available: true,
            },
        )
        .unwrap();

        let slots = list_available_slots_on(&conn, &counselor_id, today(), today()).unwrap();
        // A trailing partial slot (12:00-12:30) is not offered.
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[2].label, "11:00-12:00");
    }

    #[test]
    fn disabled_template_falls_back_to_default_window() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        repository::upsert_schedule(
            &conn,
            &counselor_id,
            &ScheduleEntry {
                weekday: 1,
                start_time: time(9, 0),
                end_time: time(12, 0),
                max_per_slot: 1,
                is_available: false,
            },
        )
        .unwrap();

        let slots = list_available_slots_on(&conn, &counselor_id, today(), today()).unwrap();
        assert_eq!(slots.len(), 14);
    }

    #[test]
    fn unknown_or_inactive_counselor_is_not_found() {
        let conn = open_memory_database().unwrap();
        let missing = list_available_slots_on(&conn, &Uuid::new_v4(), today(), today());
        assert!(matches!(missing, Err(SchedulingError::NotFound { .. })));

        let suspended = seed_counselor(&conn, CounselorStatus::Suspended);
        let result = list_available_slots_on(&conn, &suspended, today(), today());
        assert!(matches!(result, Err(SchedulingError::NotFound { .. })));
    }

    #[test]
    fn date_bounds_are_enforced() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);

        let yesterday = today() - Duration::days(1);
        assert!(matches!(
            list_available_slots_on(&conn, &counselor_id, yesterday, today()),
            Err(SchedulingError::InvalidInput(_))
        ));

        let horizon = today() + Duration::days(config::BOOKING_HORIZON_DAYS);
        assert!(list_available_slots_on(&conn, &counselor_id, horizon, today()).is_ok());
        assert!(matches!(
            list_available_slots_on(&conn, &counselor_id, horizon + Duration::days(1), today()),
            Err(SchedulingError::InvalidInput(_))
        ));
    }

    #[test]
    fn all_day_blackout_empties_the_day() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        repository::insert_blackout(
            &conn,
            &counselor_id,
            &NewBlackout {
                start_date: today(),
                end_date: today(),
                start_time: None,
                end_time: None,
                reason: Some("vacation".into()),
            },
        )
        .unwrap();

        let slots = list_available_slots_on(&conn, &counselor_id, today(), today()).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn timed_blackout_removes_covered_slots_only() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        let blackout_id = repository::insert_blackout(
            &conn,
            &counselor_id,
            &NewBlackout {
                start_date: today(),
                end_date: today(),
                start_time: Some(time(9, 0)),
                end_time: Some(time(11, 0)),
                reason: None,
            },
        )
        .unwrap();

        let slots = list_available_slots_on(&conn, &counselor_id, today(), today()).unwrap();
        assert_eq!(slots.len(), 12);
        assert!(!slots.iter().any(|s| s.start == time(9, 0)));
        assert!(!slots.iter().any(|s| s.start == time(10, 0)));
        assert!(slots.iter().any(|s| s.start == time(11, 0)));

        // Deactivating the period restores the slots.
        repository::set_blackout_active(&conn, &blackout_id, false).unwrap();
        let slots = list_available_slots_on(&conn, &counselor_id, today(), today()).unwrap();
        assert_eq!(slots.len(), 14);
    }

    #[test]
    fn booked_slot_at_capacity_disappears() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        book(&conn, counselor_id, 9, AppointmentStatus::Pending);
        book(&conn, counselor_id, 10, AppointmentStatus::Confirmed);

        let slots = list_available_slots_on(&conn, &counselor_id, today(), today()).unwrap();
        assert_eq!(slots.len(), 12);
        assert!(!slots.iter().any(|s| s.start == time(9, 0)));
        assert!(!slots.iter().any(|s| s.start == time(10, 0)));
    }

    #[test]
    fn cancelled_booking_frees_its_slot() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        let id = book(&conn, counselor_id, 9, AppointmentStatus::Pending);
        repository::update_status(&conn, &id, AppointmentStatus::Cancelled).unwrap();

        let slots = list_available_slots_on(&conn, &counselor_id, today(), today()).unwrap();
        assert_eq!(slots.len(), 14);
    }

    #[test]
    fn capacity_above_one_keeps_partially_booked_slot() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn, CounselorStatus::Active);
        repository::upsert_schedule(
            &conn,
            &counselor_id,
            &ScheduleEntry {
                weekday: 1,
                start_time: time(9, 0),
                end_time: time(12, 0),
                max_per_slot: 2,
                is_available: true,
            },
        )
        .unwrap();
        book(&conn, counselor_id, 9, AppointmentStatus::Pending);

        let slots = list_available_slots_on(&conn, &counselor_id, today(), today()).unwrap();
        assert!(slots.iter().any(|s| s.start == time(9, 0)));

        book(&conn, counselor_id, 9, AppointmentStatus::Confirmed);
        let slots = list_available_slots_on(&conn, &counselor_id, today(), today()).unwrap();
        assert!(!slots.iter().any(|s| s.start == time(9, 0)));
    }
}
