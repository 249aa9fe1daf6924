use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::authenticate;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::organization::MIN_ORGANIZATION_NAME_LEN;
use crate::models::{Event, Organization, Role, UserSummary};
use crate::services::notifications::Notification;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResponse {
    #[serde(flatten)]
    organization: Organization,
    president: UserSummary,
    staff_advisor: UserSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<Event>>,
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().len() < MIN_ORGANIZATION_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Organization name must be at least {MIN_ORGANIZATION_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Resolve president and staff advisor, checking the advisor holds the
/// staff-advisor role.
fn resolve_officers(
    db: &rusqlite::Connection,
    president_id: &str,
    staff_advisor_id: &str,
) -> Result<(UserSummary, UserSummary), AppError> {
    let president = queries::get_user_by_id(db, president_id)?
        .ok_or_else(|| AppError::NotFound("President not found".to_string()))?;
    let advisor = queries::get_user_by_id(db, staff_advisor_id)?
        .ok_or_else(|| AppError::NotFound("Staff advisor not found".to_string()))?;
    if advisor.role != Role::StaffAdvisor {
        return Err(AppError::Validation(
            "Assigned staff advisor must hold the staff advisor role".to_string(),
        ));
    }

    Ok((
        UserSummary {
            id: president.id,
            username: president.username,
            email: president.email,
        },
        UserSummary {
            id: advisor.id,
            username: advisor.username,
            email: advisor.email,
        },
    ))
}

// POST /api/organizations
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    pub name: String,
    pub president_id: String,
    pub staff_advisor_id: String,
}

pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<OrganizationResponse>), AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;

    if !claims.role.can_manage_organizations() {
        return Err(AppError::Forbidden(
            "Only staff advisors can manage organizations".to_string(),
        ));
    }
    validate_name(&body.name)?;

    let (organization, president, staff_advisor) = {
        let db = state.db.lock().unwrap();

        if queries::organization_name_exists(&db, body.name.trim(), None)? {
            return Err(AppError::Validation(format!(
                "An organization named {} already exists",
                body.name.trim()
            )));
        }
        let (president, advisor) =
            resolve_officers(&db, &body.president_id, &body.staff_advisor_id)?;

        let now = Utc::now().naive_utc();
        let organization = Organization {
            id: uuid::Uuid::new_v4().to_string(),
            name: body.name.trim().to_string(),
            president_id: president.id.clone(),
            staff_advisor_id: advisor.id.clone(),
            created_at: now,
            updated_at: now,
        };
        queries::create_organization(&db, &organization)?;
        (organization, president, advisor)
    };

    state
        .notify(Notification {
            to: vec![president.email.clone(), staff_advisor.email.clone()],
            subject: format!("Organization registered: {}", organization.name),
            body: format!(
                "The organization {} has been registered with {} as president.",
                organization.name, president.username
            ),
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(OrganizationResponse {
            organization,
            president,
            staff_advisor,
            events: None,
        }),
    ))
}

// GET /api/organizations
pub async fn get_organizations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrganizationResponse>>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let records = {
        let db = state.db.lock().unwrap();
        queries::list_organizations(&db)?
    };

    let response = records
        .into_iter()
        .map(|r| OrganizationResponse {
            organization: r.organization,
            president: r.president,
            staff_advisor: r.staff_advisor,
            events: None,
        })
        .collect();
    Ok(Json(response))
}

// GET /api/organizations/:id
pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<OrganizationResponse>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let (record, events) = {
        let db = state.db.lock().unwrap();

        let record = queries::get_organization(&db, &id)?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;
        let events = queries::list_events_for_organization(&db, &id)?;
        (record, events)
    };

    Ok(Json(OrganizationResponse {
        organization: record.organization,
        president: record.president,
        staff_advisor: record.staff_advisor,
        events: Some(events),
    }))
}

// PUT /api/organizations/:id
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    pub president_id: Option<String>,
    pub staff_advisor_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationResponse {
    #[serde(flatten)]
    organization: Organization,
    president: UserSummary,
    staff_advisor: UserSummary,
    changed_fields: Vec<String>,
}

pub async fn update_organization(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateOrganizationRequest>,
) -> Result<Json<UpdateOrganizationResponse>, AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;

    if !claims.role.can_manage_organizations() {
        return Err(AppError::Forbidden(
            "Only staff advisors can manage organizations".to_string(),
        ));
    }

    let (organization, president, staff_advisor, changed_fields) = {
        let db = state.db.lock().unwrap();

        let record = queries::get_organization(&db, &id)?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;
        let mut organization = record.organization;
        let mut changed_fields = vec![];

        if let Some(name) = body.name {
            validate_name(&name)?;
            let name = name.trim().to_string();
            if name != organization.name {
                if queries::organization_name_exists(&db, &name, Some(&id))? {
                    return Err(AppError::Validation(format!(
                        "An organization named {name} already exists"
                    )));
                }
                organization.name = name;
                changed_fields.push("name".to_string());
            }
        }
        if let Some(president_id) = body.president_id {
            if president_id != organization.president_id {
                organization.president_id = president_id;
                changed_fields.push("president".to_string());
            }
        }
        if let Some(staff_advisor_id) = body.staff_advisor_id {
            if staff_advisor_id != organization.staff_advisor_id {
                organization.staff_advisor_id = staff_advisor_id;
                changed_fields.push("staffAdvisor".to_string());
            }
        }

        let (president, advisor) = resolve_officers(
            &db,
            &organization.president_id,
            &organization.staff_advisor_id,
        )?;

        if !changed_fields.is_empty() {
            queries::update_organization(&db, &organization)?;
        }
        (organization, president, advisor, changed_fields)
    };

    if !changed_fields.is_empty() {
        state
            .notify(Notification {
                to: vec![president.email.clone(), staff_advisor.email.clone()],
                subject: format!("Organization updated: {}", organization.name),
                body: format!(
                    "The organization {} was updated. Changed: {}.",
                    organization.name,
                    changed_fields.join(", ")
                ),
            })
            .await;
    }

    Ok(Json(UpdateOrganizationResponse {
        organization,
        president,
        staff_advisor,
        changed_fields,
    }))
}

// DELETE /api/organizations/:id
pub async fn delete_organization(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;

    if !claims.role.can_manage_organizations() {
        return Err(AppError::Forbidden(
            "Only staff advisors can manage organizations".to_string(),
        ));
    }

    let record = {
        let mut db = state.db.lock().unwrap();
        let tx = db.transaction()?;

        let record = queries::get_organization(&tx, &id)?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;
        queries::delete_organization(&tx, &id)?;
        tx.commit()?;
        record
    };

    state
        .notify(Notification {
            to: vec![record.president.email, record.staff_advisor.email],
            subject: format!("Organization removed: {}", record.organization.name),
            body: format!(
                "The organization {} and its events have been removed.",
                record.organization.name
            ),
        })
        .await;

    Ok(Json(
        serde_json::json!({ "message": "Organization deleted successfully" }),
    ))
}
