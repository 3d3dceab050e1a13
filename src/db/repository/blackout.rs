use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{BlackoutPeriod, NewBlackout};

use super::{date_col, fmt_time, opt_time_col, uuid_col};

const BLACKOUT_COLUMNS: &str =
    "id, counselor_id, start_date, end_date, start_time, end_time, reason, is_active";

fn row_to_blackout(row: &rusqlite::Row<'_>) -> rusqlite::Result<BlackoutPeriod> {
    Ok(BlackoutPeriod {
        id: uuid_col(row, 0)?,
        counselor_id: uuid_col(row, 1)?,
        start_date: date_col(row, 2)?,
        end_date: date_col(row, 3)?,
        start_time: opt_time_col(row, 4)?,
        end_time: opt_time_col(row, 5)?,
        reason: row.get(6)?,
        is_active: row.get(7)?,
    })
}

pub fn insert_blackout(
    conn: &Connection,
    counselor_id: &Uuid,
    blackout: &NewBlackout,
) -> Result<Uuid, DatabaseError> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO blackout_periods
         (id, counselor_id, start_date, end_date, start_time, end_time, reason)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id.to_string(),
            counselor_id.to_string(),
            blackout.start_date.to_string(),
            blackout.end_date.to_string(),
            blackout.start_time.as_ref().map(fmt_time),
            blackout.end_time.as_ref().map(fmt_time),
            blackout.reason,
        ],
    )?;
    Ok(id)
}

pub fn get_blackout(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<BlackoutPeriod>, DatabaseError> {
    let blackout = conn
        .query_row(
            &format!("SELECT {BLACKOUT_COLUMNS} FROM blackout_periods WHERE id = ?1"),
            params![id.to_string()],
            row_to_blackout,
        )
        .optional()?;
    Ok(blackout)
}

pub fn update_blackout(
    conn: &Connection,
    id: &Uuid,
    blackout: &NewBlackout,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE blackout_periods SET
             start_date = ?1, end_date = ?2, start_time = ?3, end_time = ?4, reason = ?5
         WHERE id = ?6",
        params![
            blackout.start_date.to_string(),
            blackout.end_date.to_string(),
            blackout.start_time.as_ref().map(fmt_time),
            blackout.end_time.as_ref().map(fmt_time),
            blackout.reason,
            id.to_string(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "blackout_period".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Deactivate (or reactivate) a period; periods are never deleted.
pub fn set_blackout_active(
    conn: &Connection,
    id: &Uuid,
    is_active: bool,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE blackout_periods SET is_active = ?1 WHERE id = ?2",
        params![is_active, id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "blackout_period".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn list_blackouts(
    conn: &Connection,
    counselor_id: &Uuid,
    skip: i64,
    limit: i64,
) -> Result<Vec<BlackoutPeriod>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BLACKOUT_COLUMNS} FROM blackout_periods
         WHERE counselor_id = ?1
         ORDER BY start_date DESC, created_at DESC
         LIMIT ?2 OFFSET ?3"
    ))?;
    let rows = stmt.query_map(
        params![counselor_id.to_string(), limit, skip],
        row_to_blackout,
    )?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Active periods whose date range contains `date`.
pub fn active_blackouts_on(
    conn: &Connection,
    counselor_id: &Uuid,
    date: NaiveDate,
) -> Result<Vec<BlackoutPeriod>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BLACKOUT_COLUMNS} FROM blackout_periods
         WHERE counselor_id = ?1 AND is_active = 1
           AND start_date <= ?2 AND end_date >= ?2"
    ))?;
    let rows = stmt.query_map(
        params![counselor_id.to_string(), date.to_string()],
        row_to_blackout,
    )?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
