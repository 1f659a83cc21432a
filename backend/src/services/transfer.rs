//! Data file export and import

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use shared::{validate_answers, Company, DataFile, NewCompany};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::company::validated_name;
use crate::storage::DynStore;

/// Result of an import
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported_companies: usize,
    pub imported_answers: usize,
    /// Newly created companies, in file order
    pub companies: Vec<Company>,
}

/// Transfer service
#[derive(Clone)]
pub struct TransferService {
    store: DynStore,
}

impl TransferService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Export every company visible to the caller with its answers
    pub async fn export(&self, actor: &AuthUser) -> AppResult<DataFile> {
        let companies = self.store.list_companies(actor.company_scope()).await?;

        let mut answers = BTreeMap::new();
        for company in &companies {
            if let Some(stored) = self.store.find_answers(company.id).await? {
                answers.insert(company.id.to_string(), stored);
            }
        }

        tracing::info!(
            companies = companies.len(),
            exported_by = %actor.username,
            "Data file exported"
        );
        Ok(DataFile::new(companies, answers))
    }

    /// Import a data file. Companies get fresh ids and belong to the caller;
    /// nothing is written unless the whole file is valid.
    pub async fn import(&self, actor: &AuthUser, file: DataFile) -> AppResult<ImportSummary> {
        check_version(&file.version)?;

        let mut names = Vec::with_capacity(file.companies.len());
        for company in &file.companies {
            let name = validated_name(&NewCompany {
                name: company.name.clone(),
                data: None,
            })?;
            names.push(name);
        }
        for (company_id, answers) in &file.answers {
            if !file.companies.iter().any(|c| c.id.to_string() == *company_id) {
                return Err(AppError::Validation {
                    field: "answers".to_string(),
                    message: format!("Answers reference unknown company {}", company_id),
                });
            }
            validate_answers(answers)?;
        }

        let DataFile {
            companies,
            mut answers,
            ..
        } = file;

        let now = Utc::now();
        let batch: Vec<_> = companies
            .into_iter()
            .zip(names)
            .map(|(company, name)| {
                let company_answers = answers.remove(&company.id.to_string());
                let created = Company {
                    id: Uuid::new_v4(),
                    name,
                    data: company.data,
                    created_by: actor.username.clone(),
                    created_at: now,
                    updated_at: now,
                };
                (created, company_answers)
            })
            .collect();
        let imported_answers = batch.iter().filter(|(_, a)| a.is_some()).count();

        let imported = self.store.import(batch).await?;

        tracing::info!(
            companies = imported.len(),
            answers = imported_answers,
            imported_by = %actor.username,
            "Data file imported"
        );
        Ok(ImportSummary {
            imported_companies: imported.len(),
            imported_answers,
            companies: imported,
        })
    }
}

/// Accept files written by any 1.x release
fn check_version(version: &str) -> AppResult<()> {
    if version.split('.').next() == Some("1") {
        Ok(())
    } else {
        Err(AppError::Validation {
            field: "version".to_string(),
            message: format!("Unsupported data file version {}", version),
        })
    }
}
