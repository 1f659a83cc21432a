//! Configuration management for the Warehouse ROI platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with ROI_ prefix (`ROI__AUTH__JWT_SECRET`)
//! 4. Conventional variables: `JWT_SECRET`, `DATABASE_URL`, `PORT`
//!
//! The JWT secret has no default; loading fails without one.

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Secrets shorter than this are rejected
pub const MIN_JWT_SECRET_LEN: usize = 16;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Which persistence backend to use
    pub storage: StorageConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// First-run admin account
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL, required for the postgres backend
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Secret key for signing JWT tokens
    pub jwt_secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BootstrapConfig {
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("ROI_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("storage.backend", "postgres")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.run_migrations", true)?
            .set_default("auth.access_token_expiry", 7200)?
            .set_default("auth.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (ROI_ prefix)
            .add_source(
                Environment::with_prefix("ROI")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would start an insecure or unusable server
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "auth.jwt_secret must be at least {} characters",
                MIN_JWT_SECRET_LEN
            )));
        }
        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Message(
                "database.url is required for the postgres storage backend".to_string(),
            ));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::Message(
                "auth.bcrypt_cost must be between 4 and 31".to_string(),
            ));
        }
        Ok(())
    }

    /// Configuration for an in-memory server, used by tests and demos
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            storage: StorageConfig {
                backend: StorageBackend::Memory,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 1,
                min_connections: 1,
                run_migrations: false,
            },
            auth: AuthConfig {
                jwt_secret: jwt_secret.to_string(),
                access_token_expiry: 7200,
                bcrypt_cost: 4,
            },
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
