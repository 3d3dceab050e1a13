use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{ScheduleEntry, WeeklySchedule};

use super::{fmt_time, time_col, uuid_col};

fn row_to_schedule(row: &rusqlite::Row<'_>) -> rusqlite::Result<WeeklySchedule> {
    Ok(WeeklySchedule {
        id: uuid_col(row, 0)?,
        counselor_id: uuid_col(row, 1)?,
        weekday: row.get(2)?,
        start_time: time_col(row, 3)?,
        end_time: time_col(row, 4)?,
        max_per_slot: row.get(5)?,
        is_available: row.get(6)?,
    })
}

/// Replace the whole weekly template in one transaction.
pub fn replace_schedules(
    conn: &Connection,
    counselor_id: &Uuid,
    entries: &[ScheduleEntry],
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM counselor_schedules WHERE counselor_id = ?1",
        params![counselor_id.to_string()],
    )?;
    for entry in entries {
        tx.execute(
            "INSERT INTO counselor_schedules
             (id, counselor_id, weekday, start_time, end_time, max_per_slot, is_available)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                Uuid::new_v4().to_string(),
                counselor_id.to_string(),
                entry.weekday,
                fmt_time(&entry.start_time),
                fmt_time(&entry.end_time),
                entry.max_per_slot,
                entry.is_available,
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

/// Insert or update the template row for a single weekday.
pub fn upsert_schedule(
    conn: &Connection,
    counselor_id: &Uuid,
    entry: &ScheduleEntry,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO counselor_schedules
         (id, counselor_id, weekday, start_time, end_time, max_per_slot, is_available)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT (counselor_id, weekday) DO UPDATE SET
             start_time = excluded.start_time,
             end_time = excluded.end_time,
             max_per_slot = excluded.max_per_slot,
             is_available = excluded.is_available",
        params![
            Uuid::new_v4().to_string(),
            counselor_id.to_string(),
            entry.weekday,
            fmt_time(&entry.start_time),
            fmt_time(&entry.end_time),
            entry.max_per_slot,
            entry.is_available,
        ],
    )?;
    Ok(())
}

/// Drop every template row; the counselor falls back to the default window.
pub fn reset_schedules(conn: &Connection, counselor_id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM counselor_schedules WHERE counselor_id = ?1",
        params![counselor_id.to_string()],
    )?;
    Ok(())
}

pub fn list_schedules(
    conn: &Connection,
    counselor_id: &Uuid,
) -> Result<Vec<WeeklySchedule>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, counselor_id, weekday, start_time, end_time, max_per_slot, is_available
         FROM counselor_schedules WHERE counselor_id = ?1 ORDER BY weekday",
    )?;
    let rows = stmt.query_map(params![counselor_id.to_string()], row_to_schedule)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// The enabled template row for a weekday, if any (1 = Monday .. 7 = Sunday).
pub fn get_enabled_schedule(
    conn: &Connection,
    counselor_id: &Uuid,
    weekday: u32,
) -> Result<Option<WeeklySchedule>, DatabaseError> {
    let schedule = conn
        .query_row(
            "SELECT id, counselor_id, weekday, start_time, end_time, max_per_slot, is_available
             FROM counselor_schedules
             WHERE counselor_id = ?1 AND weekday = ?2 AND is_available = 1",
            params![counselor_id.to_string(), weekday],
            row_to_schedule,
        )
        .optional()?;
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::insert_counselor;
    use crate::models::{Counselor, CounselorStatus};
    use chrono::NaiveTime;

    fn seed_counselor(conn: &Connection) -> Uuid {
        let counselor = Counselor {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            real_name: "Dr. Wen".into(),
            specialty: None,
            status: CounselorStatus::Active,
            total_consultations: 0,
            average_rating: 0.0,
            review_count: 0,
        };
        insert_counselor(conn, &counselor).unwrap();
        counselor.id
    }

    fn entry(weekday: u32, start: &str, end: &str) -> ScheduleEntry {
        ScheduleEntry {
            weekday,
            start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end_time: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
            max_per_slot: 1,
            is_available: true,
        }
    }

    #[test]
    fn replace_overwrites_previous_template() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn);

        replace_schedules(
            &conn,
            &counselor_id,
            &[entry(1, "09:00", "17:00"), entry(2, "10:00", "16:00")],
        )
        .unwrap();
        replace_schedules(&conn, &counselor_id, &[entry(3, "08:00", "12:00")]).unwrap();

        let schedules = list_schedules(&conn, &counselor_id).unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].weekday, 3);
    }

    #[test]
    fn upsert_replaces_same_weekday() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn);

        upsert_schedule(&conn, &counselor_id, &entry(1, "09:00", "17:00")).unwrap();
        upsert_schedule(&conn, &counselor_id, &entry(1, "10:00", "14:00")).unwrap();

        let schedules = list_schedules(&conn, &counselor_id).unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(
            schedules[0].start_time,
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
    }

    #[test]
    fn enabled_lookup_skips_disabled_rows() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn);

        let mut disabled = entry(1, "09:00", "17:00");
        disabled.is_available = false;
        upsert_schedule(&conn, &counselor_id, &disabled).unwrap();
        upsert_schedule(&conn, &counselor_id, &entry(2, "09:00", "17:00")).unwrap();

        assert!(get_enabled_schedule(&conn, &counselor_id, 1)
            .unwrap()
            .is_none());
        assert!(get_enabled_schedule(&conn, &counselor_id, 2)
            .unwrap()
            .is_some());
    }

    #[test]
    fn reset_clears_template() {
        let conn = open_memory_database().unwrap();
        let counselor_id = seed_counselor(&conn);

        upsert_schedule(&conn, &counselor_id, &entry(1, "09:00", "17:00")).unwrap();
        reset_schedules(&conn, &counselor_id).unwrap();
        assert!(list_schedules(&conn, &counselor_id).unwrap().is_empty());
    }
}
