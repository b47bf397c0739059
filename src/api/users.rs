use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::warn;

use crate::api::{ApiError, ApiJson, AppState, CreateUserRequest, UpdateUserRequest, UserDto};
use crate::db::UserChanges;

fn parse_user_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("Invalid user ID: {}", raw)))
}

/// Whitespace-only values count as empty, and `"alice "` can never slip
/// past the conflict check against `"alice"`.
fn normalize_field(field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.store().users().list().await?;

    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let username = body.username.as_deref().unwrap_or("").trim();
    let email = body.email.as_deref().unwrap_or("").trim();

    if username.is_empty() || email.is_empty() {
        warn!("Create user request missing required fields");
        return Err(ApiError::validation(
            "Missing required fields: username and email",
        ));
    }

    let users = state.store().users();

    // Conflicts name the offending field, matching update.
    if users.username_taken(username, None).await? {
        warn!("Attempt to create duplicate username: {}", username);
        return Err(ApiError::conflict("Username already exists"));
    }
    if users.email_taken(email, None).await? {
        warn!("Attempt to create duplicate email: {}", email);
        return Err(ApiError::conflict("Email already exists"));
    }

    let user = users.create(username, email).await?;

    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserDto>, ApiError> {
    let id = parse_user_id(&id)?;

    let user = state
        .store()
        .users()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(id))?;

    Ok(Json(UserDto::from(user)))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let id = parse_user_id(&id)?;
    let users = state.store().users();

    let current = users
        .get(id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(id))?;

    let mut changes = UserChanges::default();

    // Only re-check uniqueness for fields that actually change; either
    // conflict leaves the whole update un-applied.
    if let Some(username) = body.username {
        let username = normalize_field("Username", &username)?;
        if username != current.username {
            if users.username_taken(&username, Some(id)).await? {
                warn!("Duplicate username in update: {}", username);
                return Err(ApiError::conflict("Username already exists"));
            }
            changes.username = Some(username);
        }
    }

    if let Some(email) = body.email {
        let email = normalize_field("Email", &email)?;
        if email != current.email {
            if users.email_taken(&email, Some(id)).await? {
                warn!("Duplicate email in update: {}", email);
                return Err(ApiError::conflict("Email already exists"));
            }
            changes.email = Some(email);
        }
    }

    let user = users
        .update(id, changes)
        .await?
        .ok_or_else(|| ApiError::user_not_found(id))?;

    Ok(Json(UserDto::from(user)))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_user_id(&id)?;

    if !state.store().users().delete(id).await? {
        warn!("User not found for deletion: {}", id);
        return Err(ApiError::user_not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}
