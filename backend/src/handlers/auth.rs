//! Authentication and user administration handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use shared::{NewUser, User};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::AuthUser;
use crate::services::auth::{AuthService, AuthTokens};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<AuthTokens>> {
    let auth_service = AuthService::new(state.store.clone(), &state.config);
    let tokens = auth_service.login(&body.username, &body.password).await?;
    Ok(Json(tokens))
}

/// Current user endpoint handler
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<User>> {
    let auth_service = AuthService::new(state.store.clone(), &state.config);
    Ok(Json(auth_service.current_user(&user).await?))
}

/// List users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<User>>> {
    let auth_service = AuthService::new(state.store.clone(), &state.config);
    Ok(Json(auth_service.list_users(&user).await?))
}

/// Create user (admin)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(body): AppJson<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let auth_service = AuthService::new(state.store.clone(), &state.config);
    let created = auth_service.create_user(&user, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete user (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let auth_service = AuthService::new(state.store.clone(), &state.config);
    auth_service.delete_user(&user, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
