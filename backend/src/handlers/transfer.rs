//! Data file export and import handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use shared::DataFile;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::AuthUser;
use crate::services::transfer::{ImportSummary, TransferService};
use crate::AppState;

pub async fn export_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<DataFile>> {
    let service = TransferService::new(state.store.clone());
    Ok(Json(service.export(&user).await?))
}

/// Import companies and answers; everything lands under the current user
pub async fn import_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(file): AppJson<DataFile>,
) -> AppResult<(StatusCode, Json<ImportSummary>)> {
    let service = TransferService::new(state.store.clone());
    let summary = service.import(&user, file).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}
