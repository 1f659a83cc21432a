//! Persistence backends
//!
//! Services talk to a [`Store`]; the server picks PostgreSQL or the in-memory
//! backend from configuration.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{Answers, Company, User, UserRole};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::config::{Config, StorageBackend};
use crate::error::{AppError, AppResult};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A stored user, including the password hash
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Storage operations used by the service layer
#[async_trait]
pub trait Store: Send + Sync {
    /// Check the backend is reachable
    async fn ping(&self) -> AppResult<()>;

    // Users
    async fn count_users(&self) -> AppResult<i64>;
    async fn find_user(&self, id: Uuid) -> AppResult<Option<UserRecord>>;
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>>;
    async fn list_users(&self) -> AppResult<Vec<UserRecord>>;
    /// Fails with `DuplicateEntry` when the username is taken
    async fn insert_user(&self, user: UserRecord) -> AppResult<UserRecord>;
    async fn delete_user(&self, id: Uuid) -> AppResult<bool>;

    // Companies
    /// All companies, or only those created by `created_by`; newest first
    async fn list_companies(&self, created_by: Option<&str>) -> AppResult<Vec<Company>>;
    async fn find_company(&self, id: Uuid) -> AppResult<Option<Company>>;
    async fn insert_company(&self, company: Company) -> AppResult<Company>;
    async fn update_company(&self, company: Company) -> AppResult<Company>;
    /// Also removes the company's answers
    async fn delete_company(&self, id: Uuid) -> AppResult<bool>;

    // Questionnaire answers
    async fn find_answers(&self, company_id: Uuid) -> AppResult<Option<Answers>>;
    async fn save_answers(&self, company_id: Uuid, answers: &Answers) -> AppResult<()>;

    /// Insert companies with their answers as one unit. On error nothing
    /// from the batch is kept. Fails with `DuplicateEntry` on an id clash.
    async fn import(&self, batch: Vec<(Company, Option<Answers>)>) -> AppResult<Vec<Company>>;
}

/// Shared handle to the configured store
pub type DynStore = Arc<dyn Store>;

/// Build the store selected in configuration
pub async fn connect(config: &Config) -> AppResult<DynStore> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let url = config.database.url.as_deref().ok_or_else(|| {
                AppError::Configuration("database.url is not set".to_string())
            })?;

            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(url)
                .await?;
            tracing::info!("Database connection established");

            if config.database.run_migrations {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
                tracing::info!("Migrations completed");
            }

            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
