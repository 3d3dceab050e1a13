//! Consultation record queries, scoped by the caller's role.

use rusqlite::Connection;

use crate::db::repository;
use crate::error::SchedulingError;
use crate::models::{Actor, ActorRole, ConsultationRecord};

const DEFAULT_PAGE_LIMIT: i64 = 100;
const MAX_PAGE_LIMIT: i64 = 1000;

/// Page of records visible to `actor`: admins see everything, counselors see
/// their own sessions, users see the sessions they booked.
pub fn list_consultation_records(
    conn: &Connection,
    actor: &Actor,
    skip: Option<i64>,
    limit: Option<i64>,
) -> Result<Vec<ConsultationRecord>, SchedulingError> {
    let skip = clamp_page(skip, 0, 0, i64::MAX);
    let limit = clamp_page(limit, DEFAULT_PAGE_LIMIT, 1, MAX_PAGE_LIMIT);

    let records = match actor.role {
        ActorRole::Admin => repository::list_all_records(conn, skip, limit)?,
        ActorRole::Counselor => {
            let counselor_id = actor
                .counselor_id
                .ok_or_else(|| SchedulingError::not_found("counselor", actor.user_id))?;
            repository::list_records_for_counselor(conn, &counselor_id, skip, limit)?
        }
        ActorRole::User => repository::list_records_for_user(conn, &actor.user_id, skip, limit)?,
    };
    Ok(records)
}

/// Clamp an optional pagination value into `[min, max]`.
fn clamp_page(value: Option<i64>, default: i64, min: i64, max: i64) -> i64 {
    value.unwrap_or(default).clamp(min, max)
}
