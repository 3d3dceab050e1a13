use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentStatus};

use super::{datetime_col, enum_col, fmt_datetime, opt_datetime_col, uuid_col};

const APPOINTMENT_COLUMNS: &str = "id, user_id, counselor_id, consult_type, consult_method, \
     start_at, end_at, description, status, summary, rating, review, \
     user_confirmed_complete, counselor_confirmed_complete";

fn row_to_appointment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        counselor_id: uuid_col(row, 2)?,
        consult_type: row.get(3)?,
        consult_method: enum_col(row, 4)?,
        start_at: datetime_col(row, 5)?,
        end_at: opt_datetime_col(row, 6)?,
        description: row.get(7)?,
        status: enum_col(row, 8)?,
        summary: row.get(9)?,
        rating: row.get(10)?,
        review: row.get(11)?,
        user_confirmed_complete: row.get(12)?,
        counselor_confirmed_complete: row.get(13)?,
    })
}

pub fn insert_appointment(
    conn: &Connection,
    appointment: &Appointment,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments
         (id, user_id, counselor_id, consult_type, consult_method, start_at, end_at,
          description, status, summary, rating, review,
          user_confirmed_complete, counselor_confirmed_complete)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            appointment.id.to_string(),
            appointment.user_id.to_string(),
            appointment.counselor_id.to_string(),
            appointment.consult_type,
            appointment.consult_method.as_str(),
            fmt_datetime(&appointment.start_at),
            appointment.end_at.as_ref().map(fmt_datetime),
            appointment.description,
            appointment.status.as_str(),
            appointment.summary,
            appointment.rating,
            appointment.review,
            appointment.user_confirmed_complete,
            appointment.counselor_confirmed_complete,
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let appointment = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
            params![id.to_string()],
            row_to_appointment,
        )
        .optional()?;
    Ok(appointment)
}

pub fn update_status(
    conn: &Connection,
    id: &Uuid,
    status: AppointmentStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![status.as_str(), id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn set_summary(conn: &Connection, id: &Uuid, summary: &str) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET summary = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![summary, id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn set_rating(
    conn: &Connection,
    id: &Uuid,
    rating: i32,
    review: Option<&str>,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET rating = ?1, review = ?2, updated_at = datetime('now')
         WHERE id = ?3",
        params![rating, review, id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Raise the requester-side completion flag. One-way: never cleared.
pub fn set_user_confirmed(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET user_confirmed_complete = 1, updated_at = datetime('now')
         WHERE id = ?1",
        params![id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Raise the counselor-side completion flag. One-way: never cleared.
pub fn set_counselor_confirmed(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET counselor_confirmed_complete = 1, updated_at = datetime('now')
         WHERE id = ?1",
        params![id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Capacity-consuming (pending or confirmed) appointments for a counselor.
pub fn list_active_for_counselor(
    conn: &Connection,
    counselor_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE counselor_id = ?1 AND status IN ('pending', 'confirmed')
         ORDER BY start_at"
    ))?;
    let rows = stmt.query_map(params![counselor_id.to_string()], row_to_appointment)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Capacity-consuming appointments booked by a user.
pub fn list_active_for_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE user_id = ?1 AND status IN ('pending', 'confirmed')
         ORDER BY start_at"
    ))?;
    let rows = stmt.query_map(params![user_id.to_string()], row_to_appointment)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Capacity-consuming appointments for a counselor starting on a given day.
pub fn list_active_for_counselor_on(
    conn: &Connection,
    counselor_id: &Uuid,
    date: NaiveDate,
) -> Result<Vec<Appointment>, DatabaseError> {
    let day_start = date.and_time(chrono::NaiveTime::MIN);
    let day_end = day_start + chrono::Duration::days(1);
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE counselor_id = ?1 AND status IN ('pending', 'confirmed')
           AND start_at >= ?2 AND start_at < ?3
         ORDER BY start_at"
    ))?;
    let rows = stmt.query_map(
        params![
            counselor_id.to_string(),
            fmt_datetime(&day_start),
            fmt_datetime(&day_end),
        ],
        row_to_appointment,
    )?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Capacity-consuming appointments starting at exactly this instant.
pub fn count_active_at_slot(
    conn: &Connection,
    counselor_id: &Uuid,
    start_at: NaiveDateTime,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM appointments
         WHERE counselor_id = ?1 AND start_at = ?2 AND status IN ('pending', 'confirmed')",
        params![counselor_id.to_string(), fmt_datetime(&start_at)],
        |row| row.get(0),
    )?;
    Ok(count)
}
