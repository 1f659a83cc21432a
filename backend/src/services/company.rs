//! Company management service

use chrono::Utc;
use serde_json::{json, Value};
use shared::{validate_company_name, Company, CompanyUpdate, NewCompany};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::storage::DynStore;

/// Company service
#[derive(Clone)]
pub struct CompanyService {
    store: DynStore,
}

impl CompanyService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Companies visible to the caller, newest first
    pub async fn list(&self, actor: &AuthUser) -> AppResult<Vec<Company>> {
        self.store.list_companies(actor.company_scope()).await
    }

    /// Fetch a company the caller may access
    pub async fn get(&self, actor: &AuthUser, company_id: Uuid) -> AppResult<Company> {
        let company = self
            .store
            .find_company(company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Company".to_string()))?;

        if !actor.can_access(&company) {
            return Err(AppError::InsufficientPermissions);
        }

        Ok(company)
    }

    pub async fn create(&self, actor: &AuthUser, input: NewCompany) -> AppResult<Company> {
        let name = validated_name(&input)?;

        let now = Utc::now();
        let company = self
            .store
            .insert_company(Company {
                id: Uuid::new_v4(),
                name,
                data: input.data.unwrap_or_else(|| json!({})),
                created_by: actor.username.clone(),
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(company_id = %company.id, created_by = %actor.username, "Company created");
        Ok(company)
    }

    /// Apply a partial update; omitted fields keep their value
    pub async fn update(
        &self,
        actor: &AuthUser,
        company_id: Uuid,
        input: CompanyUpdate,
    ) -> AppResult<Company> {
        input.validate()?;
        let mut company = self.get(actor, company_id).await?;

        if let Some(name) = input.name {
            company.name = checked_name(&name)?;
        }
        if let Some(data) = input.data {
            company.data = data;
        }
        company.updated_at = Utc::now();

        let company = self.store.update_company(company).await?;
        tracing::info!(company_id = %company.id, "Company updated");
        Ok(company)
    }

    /// Delete a company together with its answers
    pub async fn delete(&self, actor: &AuthUser, company_id: Uuid) -> AppResult<()> {
        self.get(actor, company_id).await?;
        if !self.store.delete_company(company_id).await? {
            return Err(AppError::NotFound("Company".to_string()));
        }

        tracing::info!(%company_id, deleted_by = %actor.username, "Company deleted");
        Ok(())
    }

    pub async fn get_data(&self, actor: &AuthUser, company_id: Uuid) -> AppResult<Value> {
        Ok(self.get(actor, company_id).await?.data)
    }

    /// Replace the company's free-form data blob
    pub async fn save_data(
        &self,
        actor: &AuthUser,
        company_id: Uuid,
        data: Value,
    ) -> AppResult<Value> {
        let mut company = self.get(actor, company_id).await?;
        company.data = data;
        company.updated_at = Utc::now();

        let company = self.store.update_company(company).await?;
        tracing::debug!(company_id = %company.id, "Company data saved");
        Ok(company.data)
    }
}

/// Validate a new company's name the same way for creation and import
pub(crate) fn validated_name(input: &NewCompany) -> AppResult<String> {
    input.validate()?;
    checked_name(&input.name)
}

fn checked_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    validate_company_name(name).map_err(|message| AppError::Validation {
        field: "name".to_string(),
        message: message.to_string(),
    })?;
    Ok(name.to_string())
}
