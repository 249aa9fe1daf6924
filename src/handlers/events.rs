use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::authenticate;
use crate::db::queries;
use crate::db::queries::OrganizationRecord;
use crate::errors::AppError;
use crate::models::event::{validate_time_order, MAX_VENUE_LEN};
use crate::models::{Event, EventMode, EventStatus, EventType, Organization};
use crate::services::notifications::Notification;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[serde(flatten)]
    event: Event,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<Organization>,
}

fn validate_venue(venue: &str) -> Result<(), AppError> {
    if venue.len() > MAX_VENUE_LEN {
        return Err(AppError::Validation(format!(
            "Venue must be at most {MAX_VENUE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_date_not_past(date: &NaiveDate) -> Result<(), AppError> {
    if *date < Utc::now().date_naive() {
        return Err(AppError::Validation(
            "Event date cannot be in the past".to_string(),
        ));
    }
    Ok(())
}

fn parse_status_strict(s: &str) -> Result<EventStatus, AppError> {
    match s {
        "Pending" => Ok(EventStatus::Pending),
        "Approved" => Ok(EventStatus::Approved),
        "Rejected" => Ok(EventStatus::Rejected),
        _ => Err(AppError::Validation(format!("Unknown status: {s}"))),
    }
}

fn officer_emails(record: &OrganizationRecord) -> Vec<String> {
    vec![
        record.president.email.clone(),
        record.staff_advisor.email.clone(),
    ]
}

// POST /api/events
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub organization_id: String,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub finish_time: String,
    pub time_period: String,
    pub president: String,
    pub proposal_path: String,
    pub form_path: String,
    pub mode: EventMode,
    pub event_type: EventType,
    pub venue: Option<String>,
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Event name is required".to_string()));
    }
    validate_date_not_past(&body.date)?;
    validate_time_order(&body.start_time, &body.finish_time).map_err(AppError::Validation)?;
    let venue = body.venue.unwrap_or_else(|| "N/A".to_string());
    validate_venue(&venue)?;

    let (event, organization) = {
        let mut db = state.db.lock().unwrap();
        let tx = db.transaction()?;

        let organization = queries::get_organization(&tx, &body.organization_id)?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

        if queries::event_name_exists(&tx, &body.organization_id, body.name.trim(), None)? {
            return Err(AppError::Validation(format!(
                "An event named {} already exists for this organization",
                body.name.trim()
            )));
        }

        let now = Utc::now().naive_utc();
        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            organization_id: body.organization_id,
            name: body.name.trim().to_string(),
            date: body.date,
            start_time: body.start_time,
            finish_time: body.finish_time,
            time_period: body.time_period,
            president: body.president,
            proposal_path: body.proposal_path,
            form_path: body.form_path,
            mode: body.mode,
            event_type: body.event_type,
            venue,
            status: EventStatus::Pending,
            created_by: claims.sub.clone(),
            created_at: now,
            updated_at: now,
        };
        queries::create_event(&tx, &event)?;
        tx.commit()?;
        (event, organization)
    };

    state
        .notify(Notification {
            to: officer_emails(&organization),
            subject: format!("Event registered: {}", event.name),
            body: format!(
                "The event {} ({}) has been registered for {} and is awaiting approval.",
                event.name,
                event.date.format("%Y-%m-%d"),
                organization.organization.name
            ),
        })
        .await;

    Ok((StatusCode::CREATED, Json(event)))
}

// GET /api/events
pub async fn get_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Event>>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let events = {
        let db = state.db.lock().unwrap();
        queries::list_events(&db)?
    };
    Ok(Json(events))
}

// GET /api/events/:id
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let (event, organization) = {
        let db = state.db.lock().unwrap();

        let event = queries::get_event_by_id(&db, &id)?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        let organization = queries::get_organization(&db, &event.organization_id)?;
        (event, organization)
    };

    Ok(Json(EventResponse {
        event,
        organization: organization.map(|r| r.organization),
    }))
}

// GET /api/events/organization/:id
pub async fn get_events_for_organization(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<Event>>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let events = {
        let db = state.db.lock().unwrap();

        if queries::get_organization(&db, &id)?.is_none() {
            return Err(AppError::NotFound("Organization not found".to_string()));
        }
        queries::list_events_for_organization(&db, &id)?
    };
    Ok(Json(events))
}

// PUT /api/events/:id
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub finish_time: Option<String>,
    pub time_period: Option<String>,
    pub president: Option<String>,
    pub proposal_path: Option<String>,
    pub form_path: Option<String>,
    pub mode: Option<EventMode>,
    pub event_type: Option<EventType>,
    pub venue: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventResponse {
    #[serde(flatten)]
    event: Event,
    changed_fields: Vec<String>,
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Json<UpdateEventResponse>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    if body.status.is_some() {
        return Err(AppError::Validation(
            "Status cannot be changed here; use the status endpoint".to_string(),
        ));
    }

    let (event, organization, changed_fields) = {
        let mut db = state.db.lock().unwrap();
        let tx = db.transaction()?;

        let mut event = queries::get_event_by_id(&tx, &id)?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        let organization = queries::get_organization(&tx, &event.organization_id)?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;
        let mut changed_fields = vec![];

        if let Some(name) = body.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::Validation("Event name is required".to_string()));
            }
            if name != event.name {
                if queries::event_name_exists(&tx, &event.organization_id, &name, Some(&id))? {
                    return Err(AppError::Validation(format!(
                        "An event named {name} already exists for this organization"
                    )));
                }
                event.name = name;
                changed_fields.push("name".to_string());
            }
        }
        if let Some(date) = body.date {
            if date != event.date {
                validate_date_not_past(&date)?;
                event.date = date;
                changed_fields.push("date".to_string());
            }
        }
        if let Some(start_time) = body.start_time {
            if start_time != event.start_time {
                event.start_time = start_time;
                changed_fields.push("startTime".to_string());
            }
        }
        if let Some(finish_time) = body.finish_time {
            if finish_time != event.finish_time {
                event.finish_time = finish_time;
                changed_fields.push("finishTime".to_string());
            }
        }
        // Validate the merged times, not only the fields that changed.
        validate_time_order(&event.start_time, &event.finish_time)
            .map_err(AppError::Validation)?;

        if let Some(time_period) = body.time_period {
            if time_period != event.time_period {
                event.time_period = time_period;
                changed_fields.push("timePeriod".to_string());
            }
        }
        if let Some(president) = body.president {
            if president != event.president {
                event.president = president;
                changed_fields.push("president".to_string());
            }
        }
        if let Some(proposal_path) = body.proposal_path {
            if proposal_path != event.proposal_path {
                event.proposal_path = proposal_path;
                changed_fields.push("proposalPath".to_string());
            }
        }
        if let Some(form_path) = body.form_path {
            if form_path != event.form_path {
                event.form_path = form_path;
                changed_fields.push("formPath".to_string());
            }
        }
        if let Some(mode) = body.mode {
            if mode != event.mode {
                event.mode = mode;
                changed_fields.push("mode".to_string());
            }
        }
        if let Some(event_type) = body.event_type {
            if event_type != event.event_type {
                event.event_type = event_type;
                changed_fields.push("eventType".to_string());
            }
        }
        if let Some(venue) = body.venue {
            validate_venue(&venue)?;
            if venue != event.venue {
                event.venue = venue;
                changed_fields.push("venue".to_string());
            }
        }

        if !changed_fields.is_empty() {
            queries::update_event(&tx, &event)?;
        }
        tx.commit()?;
        (event, organization, changed_fields)
    };

    if !changed_fields.is_empty() {
        state
            .notify(Notification {
                to: officer_emails(&organization),
                subject: format!("Event updated: {}", event.name),
                body: format!(
                    "The event {} was updated. Changed: {}.",
                    event.name,
                    changed_fields.join(", ")
                ),
            })
            .await;
    }

    Ok(Json(UpdateEventResponse {
        event,
        changed_fields,
    }))
}

// PUT /api/events/:id/status
#[derive(Deserialize)]
pub struct UpdateEventStatusRequest {
    pub status: String,
}

pub async fn update_event_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateEventStatusRequest>,
) -> Result<Json<Event>, AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;
    let status = parse_status_strict(&body.status)?;

    let (event, organization, old_status) = {
        let mut db = state.db.lock().unwrap();
        let tx = db.transaction()?;

        let event = queries::get_event_by_id(&tx, &id)?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        let organization = queries::get_organization(&tx, &event.organization_id)?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

        if claims.sub != organization.organization.staff_advisor_id {
            return Err(AppError::Forbidden(
                "Only the organization's staff advisor can change the event status".to_string(),
            ));
        }

        let old_status = event.status;
        queries::update_event_status(&tx, &id, status)?;
        let updated = queries::get_event_by_id(&tx, &id)?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        tx.commit()?;
        (updated, organization, old_status)
    };

    state
        .notify(Notification {
            to: officer_emails(&organization),
            subject: format!("Event {}: {}", status.as_str().to_lowercase(), event.name),
            body: format!(
                "The event {} moved from {} to {}.",
                event.name,
                old_status.as_str(),
                status.as_str()
            ),
        })
        .await;

    Ok(Json(event))
}

// DELETE /api/events/:id
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;

    let (event, organization, deleter) = {
        let mut db = state.db.lock().unwrap();
        let tx = db.transaction()?;

        let event = queries::get_event_by_id(&tx, &id)?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        let organization = queries::get_organization(&tx, &event.organization_id)?;
        let deleter = queries::get_user_by_id(&tx, &claims.sub)?
            .map(|u| u.username)
            .unwrap_or_else(|| "unknown".to_string());
        queries::delete_event(&tx, &id)?;
        tx.commit()?;
        (event, organization, deleter)
    };

    if let Some(organization) = organization {
        state
            .notify(Notification {
                to: officer_emails(&organization),
                subject: format!("Event deleted: {}", event.name),
                body: format!("The event {} was deleted by {deleter}.", event.name),
            })
            .await;
    }

    Ok(Json(serde_json::json!({ "message": "Event deleted successfully" })))
}
