//! Questionnaire handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use shared::{Answers, Question, QUESTIONS};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::AuthUser;
use crate::services::{CompanyService, QuestionnaireService, ReportingService};
use crate::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Question catalogue (public)
pub async fn list_questions() -> Json<&'static [Question]> {
    Json(QUESTIONS)
}

pub async fn get_answers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Answers>> {
    let service = QuestionnaireService::new(state.store.clone());
    Ok(Json(service.get_answers(&user, company_id).await?))
}

/// Replace the stored answers
pub async fn save_answers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(company_id): Path<Uuid>,
    AppJson(answers): AppJson<Answers>,
) -> AppResult<Json<Answers>> {
    let service = QuestionnaireService::new(state.store.clone());
    Ok(Json(service.save_answers(&user, company_id, answers).await?))
}

/// Download the questionnaire as an Excel workbook
pub async fn export_questionnaire(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(company_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let company = CompanyService::new(state.store.clone())
        .get(&user, company_id)
        .await?;
    let answers = QuestionnaireService::new(state.store.clone())
        .get_answers(&user, company_id)
        .await?;
    let result = QuestionnaireService::calculate_for(&answers);

    let workbook = ReportingService::questionnaire_workbook(&company, &answers, &result)?;
    let disposition = format!(
        "attachment; filename=\"questionnaire_{}.xlsx\"",
        company.id
    );

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        workbook,
    ))
}
