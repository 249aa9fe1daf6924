use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::models::Booking;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCheck {
    pub is_available: bool,
    pub conflicts: Vec<Booking>,
}

/// Reject inverted ranges before they reach the ledger.
pub fn validate_range(start: &NaiveDateTime, end: &NaiveDateTime) -> Result<(), String> {
    if end < start {
        return Err("End date must not be before start date".to_string());
    }
    Ok(())
}

/// Check a candidate `[start, end]` range against every approved or blocked
/// booking. Boundaries are inclusive, so touching ranges collide. Pass
/// `exclude_id` when re-checking an existing booking against its neighbours.
pub fn check_range(
    conn: &Connection,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
    exclude_id: Option<&str>,
) -> anyhow::Result<AvailabilityCheck> {
    let conflicts = queries::get_conflicting_bookings(conn, start, end, exclude_id)?;
    Ok(AvailabilityCheck {
        is_available: conflicts.is_empty(),
        conflicts,
    })
}
