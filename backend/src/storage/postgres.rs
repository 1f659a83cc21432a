//! PostgreSQL store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::{Answers, Company, UserRole};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{Store, UserRecord};
use crate::error::{AppError, AppResult};

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

/// Database row for users
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<UserRole>()
            .map_err(AppError::Internal)?;
        Ok(UserRecord {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

/// Database row for companies
#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    id: Uuid,
    name: String,
    data: Value,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            name: row.name,
            data: row.data,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";
const COMPANY_COLUMNS: &str = "id, name, data, created_by, created_at, updated_at";

const INSERT_COMPANY: &str = r#"
    INSERT INTO companies (id, name, data, created_by, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id, name, data, created_by, created_at, updated_at
"#;

const UPSERT_ANSWERS: &str = r#"
    INSERT INTO questionnaire_answers (company_id, answers, updated_at)
    VALUES ($1, $2, NOW())
    ON CONFLICT (company_id)
    DO UPDATE SET answers = EXCLUDED.answers, updated_at = NOW()
"#;

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn count_users(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<UserRecord>> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .map(UserRecord::try_from)
            .transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .map(UserRecord::try_from)
        .transpose()
    }

    async fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY username ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(UserRecord::try_from)
        .collect()
    }

    async fn insert_user(&self, user: UserRecord) -> AppResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, username, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateEntry("username".to_string())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        UserRecord::try_from(row)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_companies(&self, created_by: Option<&str>) -> AppResult<Vec<Company>> {
        let rows = sqlx::query_as::<_, CompanyRow>(&format!(
            r#"
            SELECT {}
            FROM companies
            WHERE $1::TEXT IS NULL OR created_by = $1
            ORDER BY created_at DESC, name ASC
            "#,
            COMPANY_COLUMNS
        ))
        .bind(created_by)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn find_company(&self, id: Uuid) -> AppResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {} FROM companies WHERE id = $1",
            COMPANY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Company::from))
    }

    async fn insert_company(&self, company: Company) -> AppResult<Company> {
        let row = sqlx::query_as::<_, CompanyRow>(INSERT_COMPANY)
            .bind(company.id)
            .bind(&company.name)
            .bind(&company.data)
            .bind(&company.created_by)
            .bind(company.created_at)
            .bind(company.updated_at)
            .fetch_one(&self.db)
            .await?;

        Ok(row.into())
    }

    async fn update_company(&self, company: Company) -> AppResult<Company> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            r#"
            UPDATE companies
            SET name = $2, data = $3, updated_at = $4
            WHERE id = $1
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        ))
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.data)
        .bind(company.updated_at)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company".to_string()))?;

        Ok(row.into())
    }

    async fn delete_company(&self, id: Uuid) -> AppResult<bool> {
        // Answers go with the company (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_answers(&self, company_id: Uuid) -> AppResult<Option<Answers>> {
        let answers = sqlx::query_scalar::<_, Json<Answers>>(
            "SELECT answers FROM questionnaire_answers WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(answers.map(|Json(a)| a))
    }

    async fn save_answers(&self, company_id: Uuid, answers: &Answers) -> AppResult<()> {
        sqlx::query(UPSERT_ANSWERS)
            .bind(company_id)
            .bind(Json(answers))
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn import(&self, batch: Vec<(Company, Option<Answers>)>) -> AppResult<Vec<Company>> {
        // Dropping the transaction without commit rolls it back
        let mut tx = self.db.begin().await?;

        let mut imported = Vec::with_capacity(batch.len());
        for (company, answers) in batch {
            let row = sqlx::query_as::<_, CompanyRow>(INSERT_COMPANY)
                .bind(company.id)
                .bind(&company.name)
                .bind(&company.data)
                .bind(&company.created_by)
                .bind(company.created_at)
                .bind(company.updated_at)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        AppError::DuplicateEntry("company id".to_string())
                    } else {
                        AppError::DatabaseError(e)
                    }
                })?;

            if let Some(answers) = answers {
                sqlx::query(UPSERT_ANSWERS)
                    .bind(company.id)
                    .bind(Json(&answers))
                    .execute(&mut *tx)
                    .await?;
            }
            imported.push(row.into());
        }

        tx.commit().await?;
        Ok(imported)
    }
}
