use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::authenticate;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, UserSummary};
use crate::services::scheduling;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    #[serde(flatten)]
    booking: Booking,
    creator: Option<UserSummary>,
    last_modifier: Option<UserSummary>,
}

// GET /api/calendar/bookings
pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let records = {
        let db = state.db.lock().unwrap();
        queries::list_bookings(&db)?
    };

    let response = records
        .into_iter()
        .map(|r| BookingResponse {
            booking: r.booking,
            creator: r.creator,
            last_modifier: r.last_modifier,
        })
        .collect();

    Ok(Json(response))
}

// POST /api/calendar/bookings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub title: String,
    pub description: Option<String>,
    pub venue: Option<String>,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;

    if body.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    scheduling::validate_range(&body.start_date, &body.end_date).map_err(AppError::Validation)?;

    // Conflict check and insert run inside one transaction so two overlapping
    // requests cannot both pass the check.
    let booking = {
        let mut db = state.db.lock().unwrap();
        let tx = db.transaction()?;

        let check = scheduling::check_range(&tx, &body.start_date, &body.end_date, None)?;
        if !check.is_available {
            return Err(AppError::BookingConflict(check.conflicts));
        }

        let status = if claims.role.bookings_auto_approved() {
            BookingStatus::Approved
        } else {
            BookingStatus::Pending
        };

        let now = Utc::now().naive_utc();
        let booking = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            start_date: body.start_date,
            end_date: body.end_date,
            title: body.title,
            description: body.description,
            venue: body.venue,
            status,
            is_blocked: false,
            created_by: claims.sub.clone(),
            last_modified_by: None,
            created_at: now,
            updated_at: now,
        };
        queries::create_booking(&tx, &booking)?;
        tx.commit()?;
        booking
    };

    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/calendar/check-availability
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
}

pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<scheduling::AvailabilityCheck>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    scheduling::validate_range(&query.start_date, &query.end_date)
        .map_err(AppError::Validation)?;

    let check = {
        let db = state.db.lock().unwrap();
        scheduling::check_range(&db, &query.start_date, &query.end_date, None)?
    };

    Ok(Json(check))
}

// POST /api/calendar/block-dates
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDatesRequest {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub reason: String,
}

pub async fn block_dates(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<BlockDatesRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;

    if !claims.role.can_block_dates() {
        return Err(AppError::Forbidden(
            "Only staff admin can block dates".to_string(),
        ));
    }
    if body.reason.trim().is_empty() {
        return Err(AppError::Validation("Reason is required".to_string()));
    }
    scheduling::validate_range(&body.start_date, &body.end_date).map_err(AppError::Validation)?;

    // Administrative holds are inserted without a conflict pre-check; the
    // existing ledger is left untouched.
    let booking = {
        let db = state.db.lock().unwrap();
        let now = Utc::now().naive_utc();
        let booking = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            start_date: body.start_date,
            end_date: body.end_date,
            title: format!("Blocked: {}", body.reason),
            description: Some(body.reason),
            venue: None,
            status: BookingStatus::Blocked,
            is_blocked: true,
            created_by: claims.sub.clone(),
            last_modified_by: None,
            created_at: now,
            updated_at: now,
        };
        queries::create_booking(&db, &booking)?;
        booking
    };

    Ok((StatusCode::CREATED, Json(booking)))
}

// PUT /api/calendar/bookings/:id/status
#[derive(Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateBookingStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;

    if !claims.role.can_moderate_bookings() {
        return Err(AppError::Forbidden(
            "Unauthorized to update booking status".to_string(),
        ));
    }

    let status = match body.status.as_str() {
        "approved" => BookingStatus::Approved,
        "rejected" => BookingStatus::Rejected,
        "pending" | "blocked" => {
            return Err(AppError::Validation(
                "Status must be approved or rejected".to_string(),
            ))
        }
        _ => return Err(AppError::Validation("Invalid status".to_string())),
    };

    let booking = {
        let mut db = state.db.lock().unwrap();
        let tx = db.transaction()?;

        let booking = queries::get_booking_by_id(&tx, &id)?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        // Approving must not introduce an overlap with bookings approved or
        // blocked since this one was created.
        if status == BookingStatus::Approved {
            let check =
                scheduling::check_range(&tx, &booking.start_date, &booking.end_date, Some(&id))?;
            if !check.is_available {
                return Err(AppError::BookingConflict(check.conflicts));
            }
        }

        queries::update_booking_status(&tx, &id, status, &claims.sub)?;
        let updated = queries::get_booking_by_id(&tx, &id)?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        tx.commit()?;
        updated
    };

    Ok(Json(booking))
}

// DELETE /api/calendar/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;

    {
        let db = state.db.lock().unwrap();

        let booking = queries::get_booking_by_id(&db, &id)?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let is_pending_owner =
            booking.created_by == claims.sub && booking.status == BookingStatus::Pending;
        if !claims.role.can_delete_any_booking() && !is_pending_owner {
            return Err(AppError::Forbidden(
                "Unauthorized to delete this booking".to_string(),
            ));
        }

        queries::delete_booking(&db, &id)?;
    }

    Ok(Json(serde_json::json!({ "message": "Booking deleted successfully" })))
}
