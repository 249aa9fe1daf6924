use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use super::authenticate;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;

// GET /api/users
pub async fn get_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<User>>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let users = {
        let db = state.db.lock().unwrap();
        queries::list_users(&db)?
    };
    Ok(Json(users))
}

// PUT /api/users/:id
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let user = {
        let db = state.db.lock().unwrap();

        let mut user = queries::get_user_by_id(&db, &id)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(username) = body.username {
            user.username = username;
        }
        if let Some(email) = body.email {
            if email != user.email && queries::get_user_by_email(&db, &email)?.is_some() {
                return Err(AppError::Validation(format!(
                    "{email} already has an account"
                )));
            }
            user.email = email;
        }

        queries::update_user(&db, &user)?;
        queries::get_user_by_id(&db, &id)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?
    };

    Ok(Json(user))
}

// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    authenticate(&headers, &state.config.token_secret)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_user(&db, &id)?
    };
    if !deleted {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "User deleted successfully" })))
}
