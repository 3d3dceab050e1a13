use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Counselor, CounselorStatus};

use super::{enum_col, uuid_col};

const COUNSELOR_COLUMNS: &str =
    "id, user_id, real_name, specialty, status, total_consultations, average_rating, review_count";

fn row_to_counselor(row: &rusqlite::Row<'_>) -> rusqlite::Result<Counselor> {
    Ok(Counselor {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        real_name: row.get(2)?,
        specialty: row.get(3)?,
        status: enum_col(row, 4)?,
        total_consultations: row.get(5)?,
        average_rating: row.get(6)?,
        review_count: row.get(7)?,
    })
}

pub fn insert_counselor(conn: &Connection, counselor: &Counselor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO counselors
         (id, user_id, real_name, specialty, status, total_consultations, average_rating, review_count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            counselor.id.to_string(),
            counselor.user_id.to_string(),
            counselor.real_name,
            counselor.specialty,
            counselor.status.as_str(),
            counselor.total_consultations,
            counselor.average_rating,
            counselor.review_count,
        ],
    )?;
    Ok(())
}

pub fn get_counselor(conn: &Connection, id: &Uuid) -> Result<Option<Counselor>, DatabaseError> {
    let counselor = conn
        .query_row(
            &format!("SELECT {COUNSELOR_COLUMNS} FROM counselors WHERE id = ?1"),
            params![id.to_string()],
            row_to_counselor,
        )
        .optional()?;
    Ok(counselor)
}

pub fn find_counselor_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<Counselor>, DatabaseError> {
    let counselor = conn
        .query_row(
            &format!("SELECT {COUNSELOR_COLUMNS} FROM counselors WHERE user_id = ?1"),
            params![user_id.to_string()],
            row_to_counselor,
        )
        .optional()?;
    Ok(counselor)
}

pub fn set_counselor_status(
    conn: &Connection,
    id: &Uuid,
    status: CounselorStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE counselors SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "counselor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Overwrite the derived rating aggregate with freshly recomputed values.
pub fn update_rating_aggregate(
    conn: &Connection,
    id: &Uuid,
    average_rating: f64,
    review_count: i64,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE counselors SET average_rating = ?1, review_count = ?2 WHERE id = ?3",
        params![average_rating, review_count, id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "counselor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn update_total_consultations(
    conn: &Connection,
    id: &Uuid,
    total: i64,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE counselors SET total_consultations = ?1 WHERE id = ?2",
        params![total, id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "counselor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
