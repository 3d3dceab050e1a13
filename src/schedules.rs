//! Counselor calendar management: the weekly template and blackout periods.
//!
//! All operations act on the calling counselor's own calendar; the actor must
//! carry a resolved counselor profile id.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::error::SchedulingError;
use crate::models::{Actor, BlackoutPeriod, NewBlackout, ScheduleEntry, WeeklySchedule};

/// Replace the counselor's whole weekly template.
pub fn set_weekly_schedule(
    conn: &Connection,
    actor: &Actor,
    entries: &[ScheduleEntry],
) -> Result<Vec<WeeklySchedule>, SchedulingError> {
    let counselor_id = own_counselor_id(actor)?;
    for entry in entries {
        validate_entry(entry)?;
    }
    repository::replace_schedules(conn, &counselor_id, entries)?;
    Ok(repository::list_schedules(conn, &counselor_id)?)
}

/// Insert or update the template row for one weekday.
pub fn set_weekday_schedule(
    conn: &Connection,
    actor: &Actor,
    entry: &ScheduleEntry,
) -> Result<Vec<WeeklySchedule>, SchedulingError> {
    let counselor_id = own_counselor_id(actor)?;
    validate_entry(entry)?;
    repository::upsert_schedule(conn, &counselor_id, entry)?;
    Ok(repository::list_schedules(conn, &counselor_id)?)
}

/// Drop the whole template; the counselor reverts to the default window.
pub fn clear_weekly_schedule(conn: &Connection, actor: &Actor) -> Result<(), SchedulingError> {
    let counselor_id = own_counselor_id(actor)?;
    repository::reset_schedules(conn, &counselor_id)?;
    Ok(())
}

pub fn get_weekly_schedule(
    conn: &Connection,
    actor: &Actor,
) -> Result<Vec<WeeklySchedule>, SchedulingError> {
    let counselor_id = own_counselor_id(actor)?;
    Ok(repository::list_schedules(conn, &counselor_id)?)
}

pub fn add_blackout(
    conn: &Connection,
    actor: &Actor,
    blackout: &NewBlackout,
) -> Result<Uuid, SchedulingError> {
    let counselor_id = own_counselor_id(actor)?;
    validate_blackout(blackout)?;
    Ok(repository::insert_blackout(conn, &counselor_id, blackout)?)
}

pub fn update_blackout(
    conn: &Connection,
    actor: &Actor,
    blackout_id: &Uuid,
    blackout: &NewBlackout,
) -> Result<(), SchedulingError> {
    own_blackout(conn, actor, blackout_id)?;
    validate_blackout(blackout)?;
    repository::update_blackout(conn, blackout_id, blackout)?;
    Ok(())
}

/// Periods are deactivated, never deleted, so past availability stays
/// explainable.
pub fn deactivate_blackout(
    conn: &Connection,
    actor: &Actor,
    blackout_id: &Uuid,
) -> Result<(), SchedulingError> {
    own_blackout(conn, actor, blackout_id)?;
    repository::set_blackout_active(conn, blackout_id, false)?;
    Ok(())
}

pub fn list_blackouts(
    conn: &Connection,
    actor: &Actor,
    skip: i64,
    limit: i64,
) -> Result<Vec<BlackoutPeriod>, SchedulingError> {
    let counselor_id = own_counselor_id(actor)?;
    Ok(repository::list_blackouts(conn, &counselor_id, skip, limit)?)
}

fn own_counselor_id(actor: &Actor) -> Result<Uuid, SchedulingError> {
    actor.counselor_id.ok_or(SchedulingError::Forbidden {
        action: "manage schedule",
    })
}

fn own_blackout(
    conn: &Connection,
    actor: &Actor,
    blackout_id: &Uuid,
) -> Result<BlackoutPeriod, SchedulingError> {
    let counselor_id = own_counselor_id(actor)?;
    let blackout = repository::get_blackout(conn, blackout_id)?
        .ok_or_else(|| SchedulingError::not_found("blackout_period", blackout_id))?;
    if blackout.counselor_id != counselor_id {
        return Err(SchedulingError::Forbidden {
            action: "manage schedule",
        });
    }
    Ok(blackout)
}

fn validate_entry(entry: &ScheduleEntry) -> Result<(), SchedulingError> {
    if !(1..=7).contains(&entry.weekday) {
        return Err(SchedulingError::InvalidInput(
            "weekday must be between 1 (Monday) and 7 (Sunday)".into(),
        ));
    }
    if entry.end_time <= entry.start_time {
        return Err(SchedulingError::InvalidInput(
            "schedule end time must be after its start time".into(),
        ));
    }
    if entry.max_per_slot == 0 {
        return Err(SchedulingError::InvalidInput(
            "per-slot capacity must be at least 1".into(),
        ));
    }
    Ok(())
}

fn validate_blackout(blackout: &NewBlackout) -> Result<(), SchedulingError> {
    if blackout.end_date < blackout.start_date {
        return Err(SchedulingError::InvalidInput(
            "blackout end date must not precede its start date".into(),
        ));
    }
    match (blackout.start_time, blackout.end_time) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) if end > start => Ok(()),
        (Some(_), Some(_)) => Err(SchedulingError::InvalidInput(
            "blackout end time must be after its start time".into(),
        )),
        _ => Err(SchedulingError::InvalidInput(
            "a timed blackout needs both a start and an end time".into(),
        )),
    }
}
