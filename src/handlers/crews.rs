use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use super::authenticate;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Crew, CrewMember};
use crate::state::AppState;

// POST /api/crews
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCrewRequest {
    pub name: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub work_type: Option<String>,
    pub leader: Option<String>,
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub crew_members: Vec<CreateCrewMemberRequest>,
}

#[derive(Deserialize)]
pub struct CreateCrewMemberRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

pub async fn create_crew(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateCrewRequest>,
) -> Result<(StatusCode, Json<Crew>), AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Crew name is required".to_string()));
    }

    let crew = {
        let mut db = state.db.lock().unwrap();
        let tx = db.transaction()?;

        let crew = Crew {
            id: uuid::Uuid::new_v4().to_string(),
            name: body.name.trim().to_string(),
            description: body.description,
            phone: body.phone,
            email: body.email,
            work_type: body.work_type,
            leader: body.leader,
            profile_pic: body.profile_pic,
            status: "active".to_string(),
            crew_members: body
                .crew_members
                .into_iter()
                .map(|m| CrewMember {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: m.name,
                    email: m.email,
                    phone: m.phone,
                })
                .collect(),
        };
        queries::create_crew(&tx, &crew)?;
        tx.commit()?;
        crew
    };

    Ok((StatusCode::CREATED, Json(crew)))
}

// GET /api/crews
pub async fn get_crews(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Crew>>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let crews = {
        let db = state.db.lock().unwrap();
        queries::list_crews(&db)?
    };
    Ok(Json(crews))
}

// GET /api/crews/:id
pub async fn get_crew(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Crew>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let crew = {
        let db = state.db.lock().unwrap();
        queries::get_crew(&db, &id)?
    };
    crew.map(Json)
        .ok_or_else(|| AppError::NotFound("Crew not found".to_string()))
}

// PUT /api/crews/:id
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCrewRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub work_type: Option<String>,
    pub leader: Option<String>,
    pub profile_pic: Option<String>,
}

pub async fn update_crew(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateCrewRequest>,
) -> Result<Json<Crew>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let crew = {
        let db = state.db.lock().unwrap();

        let mut crew = queries::get_crew(&db, &id)?
            .ok_or_else(|| AppError::NotFound("Crew not found".to_string()))?;

        if let Some(name) = body.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("Crew name is required".to_string()));
            }
            crew.name = name.trim().to_string();
        }
        if let Some(description) = body.description {
            crew.description = Some(description);
        }
        if let Some(phone) = body.phone {
            crew.phone = Some(phone);
        }
        if let Some(email) = body.email {
            crew.email = Some(email);
        }
        if let Some(work_type) = body.work_type {
            crew.work_type = Some(work_type);
        }
        if let Some(leader) = body.leader {
            crew.leader = Some(leader);
        }
        if let Some(profile_pic) = body.profile_pic {
            crew.profile_pic = Some(profile_pic);
        }

        queries::update_crew(&db, &crew)?;
        crew
    };

    Ok(Json(crew))
}

// PUT /api/crews/:id/status
#[derive(Deserialize)]
pub struct UpdateCrewStatusRequest {
    pub status: String,
}

pub async fn update_crew_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateCrewStatusRequest>,
) -> Result<Json<Crew>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    if !matches!(body.status.as_str(), "active" | "inactive") {
        return Err(AppError::Validation(
            "Status must be active or inactive".to_string(),
        ));
    }

    let crew = {
        let db = state.db.lock().unwrap();

        if !queries::update_crew_status(&db, &id, &body.status)? {
            return Err(AppError::NotFound("Crew not found".to_string()));
        }
        queries::get_crew(&db, &id)?
            .ok_or_else(|| AppError::NotFound("Crew not found".to_string()))?
    };

    Ok(Json(crew))
}

// DELETE /api/crews/:id
pub async fn delete_crew(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_crew(&db, &id)?
    };
    if !deleted {
        return Err(AppError::NotFound("Crew not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Crew deleted successfully" })))
}

// POST /api/crews/:id/members
pub async fn add_crew_member(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<CreateCrewMemberRequest>,
) -> Result<(StatusCode, Json<Crew>), AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let crew = {
        let db = state.db.lock().unwrap();

        if queries::get_crew(&db, &id)?.is_none() {
            return Err(AppError::NotFound("Crew not found".to_string()));
        }

        let member = CrewMember {
            id: uuid::Uuid::new_v4().to_string(),
            name: body.name,
            email: body.email,
            phone: body.phone,
        };
        queries::add_crew_member(&db, &id, &member)?;
        queries::get_crew(&db, &id)?
            .ok_or_else(|| AppError::NotFound("Crew not found".to_string()))?
    };

    Ok((StatusCode::CREATED, Json(crew)))
}

// PUT /api/crews/:id/members/:member_id
pub async fn update_crew_member(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, member_id)): Path<(String, String)>,
    Json(body): Json<CreateCrewMemberRequest>,
) -> Result<Json<Crew>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let crew = {
        let db = state.db.lock().unwrap();

        let member = CrewMember {
            id: member_id,
            name: body.name,
            email: body.email,
            phone: body.phone,
        };
        if !queries::update_crew_member(&db, &id, &member)? {
            return Err(AppError::NotFound("Crew member not found".to_string()));
        }
        queries::get_crew(&db, &id)?
            .ok_or_else(|| AppError::NotFound("Crew not found".to_string()))?
    };

    Ok(Json(crew))
}

// DELETE /api/crews/:id/members/:member_id
pub async fn remove_crew_member(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, member_id)): Path<(String, String)>,
) -> Result<Json<Crew>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let crew = {
        let db = state.db.lock().unwrap();

        if !queries::remove_crew_member(&db, &id, &member_id)? {
            return Err(AppError::NotFound("Crew member not found".to_string()));
        }
        queries::get_crew(&db, &id)?
            .ok_or_else(|| AppError::NotFound("Crew not found".to_string()))?
    };

    Ok(Json(crew))
}
