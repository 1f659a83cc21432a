//! ROI calculation handlers

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use shared::{Answers, RoiResult};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::AuthUser;
use crate::services::reporting::{ExportFormat, ReportingService};
use crate::services::QuestionnaireService;
use crate::AppState;

#[derive(Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// Calculate ROI for answers supplied in the request body
pub async fn calculate(AppJson(answers): AppJson<Answers>) -> Json<RoiResult> {
    Json(QuestionnaireService::calculate_for(&answers))
}

/// Calculate ROI from a company's stored answers
pub async fn company_roi(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<RoiResult>> {
    let service = QuestionnaireService::new(state.store.clone());
    Ok(Json(service.calculate(&user, company_id).await?))
}

/// Export a company's ROI breakdown
pub async fn export_company_roi(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let service = QuestionnaireService::new(state.store.clone());
    let result = service.calculate(&user, company_id).await?;

    match query.format {
        ExportFormat::Csv => {
            let csv = ReportingService::roi_csv(&result)?;
            let disposition = format!("attachment; filename=\"roi_{}.csv\"", company_id);
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response())
        }
        ExportFormat::Json => Ok(Json(result).into_response()),
    }
}
