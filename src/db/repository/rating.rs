use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;

/// Insert or overwrite the rating row for an appointment. Re-rating replaces
/// the previous value so each appointment contributes at most one source row.
pub fn upsert_rating(
    conn: &Connection,
    appointment_id: &Uuid,
    user_id: &Uuid,
    counselor_id: &Uuid,
    rating: i32,
    review: Option<&str>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO counselor_ratings (id, appointment_id, user_id, counselor_id, rating, review)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (appointment_id) DO UPDATE SET
             rating = excluded.rating,
             review = excluded.review",
        params![
            Uuid::new_v4().to_string(),
            appointment_id.to_string(),
            user_id.to_string(),
            counselor_id.to_string(),
            rating,
            review,
        ],
    )?;
    Ok(())
}

/// Recompute (mean rounded to 2 decimals, count) from all source rows.
pub fn rating_aggregate(
    conn: &Connection,
    counselor_id: &Uuid,
) -> Result<(f64, i64), DatabaseError> {
    let (avg, count): (Option<f64>, i64) = conn.query_row(
        "SELECT AVG(rating), COUNT(*) FROM counselor_ratings WHERE counselor_id = ?1",
        params![counselor_id.to_string()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let rounded = (avg.unwrap_or(0.0) * 100.0).round() / 100.0;
    Ok((rounded, count))
}
