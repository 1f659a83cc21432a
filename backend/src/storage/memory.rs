//! In-memory store for tests, demos and local development

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use shared::{Answers, Company};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, UserRecord};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    companies: HashMap<Uuid, Company>,
    answers: HashMap<Uuid, Answers>,
}

/// Store keeping everything in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn count_users(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> =
            self.tables.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn insert_user(&self, user: UserRecord) -> AppResult<UserRecord> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(AppError::DuplicateEntry("username".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.write().await.users.remove(&id).is_some())
    }

    async fn list_companies(&self, created_by: Option<&str>) -> AppResult<Vec<Company>> {
        let tables = self.tables.read().await;
        let mut companies: Vec<Company> = tables
            .companies
            .values()
            .filter(|c| created_by.map_or(true, |owner| c.created_by == owner))
            .cloned()
            .collect();
        companies.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(companies)
    }

    async fn find_company(&self, id: Uuid) -> AppResult<Option<Company>> {
        Ok(self.tables.read().await.companies.get(&id).cloned())
    }

    async fn insert_company(&self, company: Company) -> AppResult<Company> {
        self.tables
            .write()
            .await
            .companies
            .insert(company.id, company.clone());
        Ok(company)
    }

    async fn update_company(&self, company: Company) -> AppResult<Company> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .companies
            .get_mut(&company.id)
            .ok_or_else(|| AppError::NotFound("Company".to_string()))?;
        existing.name = company.name;
        existing.data = company.data;
        existing.updated_at = company.updated_at;
        Ok(existing.clone())
    }

    async fn delete_company(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        tables.answers.remove(&id);
        Ok(tables.companies.remove(&id).is_some())
    }

    async fn find_answers(&self, company_id: Uuid) -> AppResult<Option<Answers>> {
        Ok(self.tables.read().await.answers.get(&company_id).cloned())
    }

    async fn save_answers(&self, company_id: Uuid, answers: &Answers) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.companies.contains_key(&company_id) {
            return Err(AppError::NotFound("Company".to_string()));
        }
        tables.answers.insert(company_id, answers.clone());
        Ok(())
    }

    async fn import(&self, batch: Vec<(Company, Option<Answers>)>) -> AppResult<Vec<Company>> {
        let mut tables = self.tables.write().await;

        let mut seen = HashSet::new();
        for (company, _) in &batch {
            if tables.companies.contains_key(&company.id) || !seen.insert(company.id) {
                return Err(AppError::DuplicateEntry("company id".to_string()));
            }
        }

        let mut imported = Vec::with_capacity(batch.len());
        for (company, answers) in batch {
            if let Some(answers) = answers {
                tables.answers.insert(company.id, answers);
            }
            tables.companies.insert(company.id, company.clone());
            imported.push(company);
        }
        Ok(imported)
    }
}
