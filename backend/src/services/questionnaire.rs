//! Questionnaire answers and ROI calculation service

use shared::{calculate_roi, validate_answers, Answers, RoiResult};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::CompanyService;
use crate::storage::DynStore;

/// Questionnaire service
#[derive(Clone)]
pub struct QuestionnaireService {
    store: DynStore,
    companies: CompanyService,
}

impl QuestionnaireService {
    pub fn new(store: DynStore) -> Self {
        Self {
            companies: CompanyService::new(store.clone()),
            store,
        }
    }

    /// Stored answers for a company; empty when nothing has been saved yet
    pub async fn get_answers(&self, actor: &AuthUser, company_id: Uuid) -> AppResult<Answers> {
        self.companies.get(actor, company_id).await?;
        Ok(self.store.find_answers(company_id).await?.unwrap_or_default())
    }

    /// Replace a company's answers after checking them against the catalogue
    pub async fn save_answers(
        &self,
        actor: &AuthUser,
        company_id: Uuid,
        answers: Answers,
    ) -> AppResult<Answers> {
        self.companies.get(actor, company_id).await?;
        validate_answers(&answers)?;

        self.store.save_answers(company_id, &answers).await?;
        tracing::info!(%company_id, answered = answers.len(), "Questionnaire answers saved");
        Ok(answers)
    }

    /// ROI estimate from a company's stored answers
    pub async fn calculate(&self, actor: &AuthUser, company_id: Uuid) -> AppResult<RoiResult> {
        let answers = self.get_answers(actor, company_id).await?;
        Ok(Self::calculate_for(&answers))
    }

    /// ROI estimate for answers that are not stored
    pub fn calculate_for(answers: &Answers) -> RoiResult {
        let result = calculate_roi(answers);
        tracing::debug!(
            annual_savings = %result.summary.annual_savings,
            roi_percent = %result.summary.roi_percent,
            "ROI calculated"
        );
        result
    }
}
