use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::ConsultationRecord;

use super::{datetime_col, enum_col, fmt_datetime, opt_datetime_col, uuid_col};

const RECORD_COLUMNS: &str = "id, appointment_id, user_id, counselor_id, consult_type, \
     consult_method, start_at, end_at, description, summary, rating, review, \
     user_confirmed_at, counselor_confirmed_at";

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConsultationRecord> {
    Ok(ConsultationRecord {
        id: uuid_col(row, 0)?,
        appointment_id: uuid_col(row, 1)?,
        user_id: uuid_col(row, 2)?,
        counselor_id: uuid_col(row, 3)?,
        consult_type: row.get(4)?,
        consult_method: enum_col(row, 5)?,
        start_at: datetime_col(row, 6)?,
        end_at: opt_datetime_col(row, 7)?,
        description: row.get(8)?,
        summary: row.get(9)?,
        rating: row.get(10)?,
        review: row.get(11)?,
        user_confirmed_at: datetime_col(row, 12)?,
        counselor_confirmed_at: datetime_col(row, 13)?,
    })
}

pub fn insert_record(conn: &Connection, record: &ConsultationRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO consultation_records
         (id, appointment_id, user_id, counselor_id, consult_type, consult_method,
          start_at, end_at, description, summary, rating, review,
          user_confirmed_at, counselor_confirmed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            record.id.to_string(),
            record.appointment_id.to_string(),
            record.user_id.to_string(),
            record.counselor_id.to_string(),
            record.consult_type,
            record.consult_method.as_str(),
            fmt_datetime(&record.start_at),
            record.end_at.as_ref().map(fmt_datetime),
            record.description,
            record.summary,
            record.rating,
            record.review,
            fmt_datetime(&record.user_confirmed_at),
            fmt_datetime(&record.counselor_confirmed_at),
        ],
    )?;
    Ok(())
}

pub fn record_exists_for_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM consultation_records WHERE appointment_id = ?1",
        params![appointment_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_record_for_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Option<ConsultationRecord>, DatabaseError> {
    let record = conn
        .query_row(
            &format!("SELECT {RECORD_COLUMNS} FROM consultation_records WHERE appointment_id = ?1"),
            params![appointment_id.to_string()],
            row_to_record,
        )
        .optional()?;
    Ok(record)
}

/// Number of records for a counselor; source of the `total_consultations`
/// aggregate.
pub fn count_records_for_counselor(
    conn: &Connection,
    counselor_id: &Uuid,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM consultation_records WHERE counselor_id = ?1",
        params![counselor_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Mirror a late rating/review edit onto the snapshot. A no-op when the
/// appointment has no record yet.
pub fn update_record_rating(
    conn: &Connection,
    appointment_id: &Uuid,
    rating: i32,
    review: Option<&str>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE consultation_records SET rating = ?1, review = ?2 WHERE appointment_id = ?3",
        params![rating, review, appointment_id.to_string()],
    )?;
    Ok(())
}

pub fn list_all_records(
    conn: &Connection,
    skip: i64,
    limit: i64,
) -> Result<Vec<ConsultationRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM consultation_records
         ORDER BY start_at DESC LIMIT ?1 OFFSET ?2"
    ))?;
    let rows = stmt.query_map(params![limit, skip], row_to_record)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn list_records_for_user(
    conn: &Connection,
    user_id: &Uuid,
    skip: i64,
    limit: i64,
) -> Result<Vec<ConsultationRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM consultation_records
         WHERE user_id = ?1 ORDER BY start_at DESC LIMIT ?2 OFFSET ?3"
    ))?;
    let rows = stmt.query_map(params![user_id.to_string(), limit, skip], row_to_record)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn list_records_for_counselor(
    conn: &Connection,
    counselor_id: &Uuid,
    skip: i64,
    limit: i64,
) -> Result<Vec<ConsultationRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM consultation_records
         WHERE counselor_id = ?1 ORDER BY start_at DESC LIMIT ?2 OFFSET ?3"
    ))?;
    let rows = stmt.query_map(
        params![counselor_id.to_string(), limit, skip],
        row_to_record,
    )?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
