//! Company management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;
use shared::{Company, CompanyUpdate, NewCompany};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::AuthUser;
use crate::services::CompanyService;
use crate::AppState;

/// List companies visible to the current user
pub async fn list_companies(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Company>>> {
    let service = CompanyService::new(state.store.clone());
    Ok(Json(service.list(&user).await?))
}

pub async fn get_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Company>> {
    let service = CompanyService::new(state.store.clone());
    Ok(Json(service.get(&user, company_id).await?))
}

pub async fn create_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(input): AppJson<NewCompany>,
) -> AppResult<(StatusCode, Json<Company>)> {
    let service = CompanyService::new(state.store.clone());
    let company = service.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn update_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(company_id): Path<Uuid>,
    AppJson(input): AppJson<CompanyUpdate>,
) -> AppResult<Json<Company>> {
    let service = CompanyService::new(state.store.clone());
    Ok(Json(service.update(&user, company_id, input).await?))
}

/// Delete a company and its answers
pub async fn delete_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(company_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = CompanyService::new(state.store.clone());
    service.delete(&user, company_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the company's free-form data
pub async fn get_company_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let service = CompanyService::new(state.store.clone());
    Ok(Json(service.get_data(&user, company_id).await?))
}

/// Replace the company's free-form data
pub async fn save_company_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(company_id): Path<Uuid>,
    AppJson(data): AppJson<Value>,
) -> AppResult<Json<Value>> {
    let service = CompanyService::new(state.store.clone());
    Ok(Json(service.save_data(&user, company_id, data).await?))
}
