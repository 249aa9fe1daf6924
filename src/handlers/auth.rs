use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::authenticate;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Role, User};
use crate::services::auth::{hash_password, is_strong_password, issue_token, verify_password};
use crate::state::AppState;

#[derive(Serialize)]
pub struct AuthResponse {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

fn validate_username(username: &str) -> Result<(), AppError> {
    let ok = (3..=30).contains(&username.len())
        && username.chars().all(|c| c.is_ascii_alphanumeric());
    if ok {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Username must be 3-30 alphanumeric characters".to_string(),
        ))
    }
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let ok = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if ok {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid email address".to_string()))
    }
}

// POST /api/auth/register
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validate_username(&body.username)?;
    validate_email(&body.email)?;
    if !is_strong_password(&body.password) {
        return Err(AppError::Validation(
            "Password must be at least 8 characters with upper, lower and digit".to_string(),
        ));
    }

    let user = {
        let db = state.db.lock().unwrap();

        if queries::get_user_by_email(&db, &body.email)?.is_some() {
            return Err(AppError::Validation(format!(
                "{} already has an account",
                body.email
            )));
        }

        let now = Utc::now().naive_utc();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: body.username,
            email: body.email,
            password_hash: hash_password(&body.password)?,
            role: Role::Organizer,
            created_at: now,
            updated_at: now,
        };
        queries::create_user(&db, &user)?;
        user
    };

    let token = issue_token(&state.config.token_secret, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            username: user.username,
            email: user.email,
            role: user.role,
            token,
        }),
    ))
}

// POST /api/auth/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = {
        let db = state.db.lock().unwrap();
        queries::get_user_by_email(&db, &body.email)?
    };

    let user = user.ok_or(AppError::Unauthorized)?;
    if !verify_password(&body.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let token = issue_token(&state.config.token_secret, &user)?;
    Ok(Json(AuthResponse {
        username: user.username,
        email: user.email,
        role: user.role,
        token,
    }))
}

// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<User>, AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;

    let user = {
        let db = state.db.lock().unwrap();
        queries::get_user_by_id(&db, &claims.sub)?
    };

    user.map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

// POST /api/auth/change-role
#[derive(Deserialize)]
pub struct ChangeRoleRequest {
    pub email: String,
    pub role: String,
}

pub async fn change_role(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ChangeRoleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;

    if !claims.role.can_change_roles() {
        return Err(AppError::Forbidden(
            "Only staff admin can change roles".to_string(),
        ));
    }

    let role = Role::parse_strict(&body.role)
        .ok_or_else(|| AppError::Validation(format!("Unknown role: {}", body.role)))?;

    {
        let db = state.db.lock().unwrap();

        let user = queries::get_user_by_email(&db, &body.email)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if user.role == role {
            return Err(AppError::Validation(format!(
                "{} already has the {} role",
                body.email,
                role.as_str()
            )));
        }

        queries::update_user_role(&db, &body.email, role)?;
    }

    Ok(Json(serde_json::json!({
        "message": "Role updated successfully",
        "email": body.email,
        "role": role,
    })))
}

// POST /api/auth/change-password
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = authenticate(&headers, &state.config.token_secret)?;

    if !is_strong_password(&body.new_password) {
        return Err(AppError::Validation(
            "Password must be at least 8 characters with upper, lower and digit".to_string(),
        ));
    }

    {
        let db = state.db.lock().unwrap();

        let user = queries::get_user_by_id(&db, &claims.sub)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if !verify_password(&body.old_password, &user.password_hash) {
            return Err(AppError::Forbidden("Old password is incorrect".to_string()));
        }

        let hash = hash_password(&body.new_password)?;
        queries::update_user_password(&db, &user.email, &hash)?;
    }

    Ok(Json(serde_json::json!({ "message": "Password updated successfully" })))
}
