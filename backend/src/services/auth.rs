//! Authentication service for login, token management and user administration

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use shared::{validate_password, validate_username, NewUser, User, UserRole};
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::storage::{DynStore, UserRecord};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: DynStore,
    jwt_secret: String,
    access_token_expiry: i64,
    bcrypt_cost: u32,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

/// Issued access token
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

impl AuthService {
    pub fn new(store: DynStore, config: &Config) -> Self {
        Self {
            store,
            jwt_secret: config.auth.jwt_secret.clone(),
            access_token_expiry: config.auth.access_token_expiry,
            bcrypt_cost: config.auth.bcrypt_cost,
        }
    }

    /// Authenticate with username and password
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthTokens> {
        let user = self
            .store
            .find_user_by_username(username.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::debug!(username = %user.username, "Rejected login");
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(username = %user.username, "User logged in");
        self.generate_token(&user)
    }

    /// Validate an access token and return its claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })?;

        Ok(token_data.claims)
    }

    /// The account behind an authenticated request
    pub async fn current_user(&self, actor: &AuthUser) -> AppResult<User> {
        self.store
            .find_user(actor.user_id)
            .await?
            .map(|u| u.to_user())
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Create a user account (admin only)
    pub async fn create_user(&self, actor: &AuthUser, input: NewUser) -> AppResult<User> {
        actor.require_admin()?;
        let user = self.insert_user(input).await?;
        tracing::info!(
            username = %user.username,
            role = %user.role,
            created_by = %actor.username,
            "User created"
        );
        Ok(user)
    }

    /// List every account (admin only)
    pub async fn list_users(&self, actor: &AuthUser) -> AppResult<Vec<User>> {
        actor.require_admin()?;
        let users = self.store.list_users().await?;
        Ok(users.iter().map(UserRecord::to_user).collect())
    }

    /// Delete an account (admin only). Admins cannot delete themselves.
    pub async fn delete_user(&self, actor: &AuthUser, user_id: Uuid) -> AppResult<()> {
        actor.require_admin()?;
        if actor.user_id == user_id {
            return Err(AppError::Validation {
                field: "user_id".to_string(),
                message: "You cannot delete your own account".to_string(),
            });
        }

        if !self.store.delete_user(user_id).await? {
            return Err(AppError::NotFound("User".to_string()));
        }

        tracing::info!(%user_id, deleted_by = %actor.username, "User deleted");
        Ok(())
    }

    /// Create the first admin when no users exist yet.
    /// Returns the new account, or `None` when users already exist.
    pub async fn ensure_bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<User>> {
        if self.store.count_users().await? > 0 {
            return Ok(None);
        }

        let user = self
            .insert_user(NewUser {
                username: username.to_string(),
                password: password.to_string(),
                role: UserRole::Admin,
            })
            .await?;
        tracing::info!(username = %user.username, "Bootstrap admin created");
        Ok(Some(user))
    }

    async fn insert_user(&self, input: NewUser) -> AppResult<User> {
        let username = input.username.trim().to_string();
        validate_username(&username).map_err(|message| AppError::Validation {
            field: "username".to_string(),
            message: message.to_string(),
        })?;
        validate_password(&input.password).map_err(|message| AppError::Validation {
            field: "password".to_string(),
            message: message.to_string(),
        })?;
        input.validate()?;

        let password_hash = self.hash_password(input.password).await?;
        let record = self
            .store
            .insert_user(UserRecord {
                id: Uuid::new_v4(),
                username,
                password_hash,
                role: input.role,
                created_at: Utc::now(),
            })
            .await?;

        Ok(record.to_user())
    }

    fn generate_token(&self, user: &UserRecord) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            user: user.to_user(),
        })
    }

    // bcrypt is CPU-bound; keep it off the async workers
    async fn hash_password(&self, password: String) -> AppResult<String> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || verify(password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    const SECRET: &str = "test-secret-0123456789";

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryStore::new()), &Config::in_memory(SECRET))
    }

    fn admin() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            username: "admin".to_string(),
            role: UserRole::Admin,
        }
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "correct-horse".to_string(),
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn test_login_issues_valid_token() {
        let auth = service();
        auth.create_user(&admin(), new_user("alice")).await.unwrap();

        let tokens = auth.login("alice", "correct-horse").await.unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 7200);

        let claims = auth.validate_token(&tokens.access_token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.sub, tokens.user.id.to_string());
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_user() {
        let auth = service();
        auth.create_user(&admin(), new_user("alice")).await.unwrap();

        assert!(matches!(
            auth.login("alice", "wrong-password").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody", "correct-horse").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let auth = service();
        auth.create_user(&admin(), new_user("alice")).await.unwrap();
        let tokens = auth.login("alice", "correct-horse").await.unwrap();

        let other = AuthService::new(
            Arc::new(MemoryStore::new()),
            &Config::in_memory("another-secret-9876543210"),
        );
        assert!(matches!(
            other.validate_token(&tokens.access_token),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            auth.validate_token("not-a-jwt"),
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let mut config = Config::in_memory(SECRET);
        config.auth.access_token_expiry = -3600;
        let auth = AuthService::new(Arc::new(MemoryStore::new()), &config);
        auth.create_user(&admin(), new_user("alice")).await.unwrap();

        let tokens = auth.login("alice", "correct-horse").await.unwrap();
        assert!(matches!(
            auth.validate_token(&tokens.access_token),
            Err(AppError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_only_admins_manage_users() {
        let auth = service();
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
            role: UserRole::User,
        };

        assert!(matches!(
            auth.create_user(&user, new_user("bob")).await,
            Err(AppError::InsufficientPermissions)
        ));
        assert!(matches!(
            auth.list_users(&user).await,
            Err(AppError::InsufficientPermissions)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_and_invalid_usernames() {
        let auth = service();
        auth.create_user(&admin(), new_user("alice")).await.unwrap();

        assert!(matches!(
            auth.create_user(&admin(), new_user("alice")).await,
            Err(AppError::DuplicateEntry(_))
        ));
        assert!(matches!(
            auth.create_user(&admin(), new_user("a b")).await,
            Err(AppError::Validation { .. })
        ));

        let mut short_password = new_user("carol");
        short_password.password = "short".to_string();
        assert!(matches!(
            auth.create_user(&admin(), short_password).await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let auth = service();
        let actor = admin();
        let bob = auth.create_user(&actor, new_user("bob")).await.unwrap();

        assert!(matches!(
            auth.delete_user(&actor, actor.user_id).await,
            Err(AppError::Validation { .. })
        ));

        auth.delete_user(&actor, bob.id).await.unwrap();
        assert!(auth.list_users(&actor).await.unwrap().is_empty());
        assert!(matches!(
            auth.delete_user(&actor, bob.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_only_when_empty() {
        let auth = service();
        let created = auth
            .ensure_bootstrap_admin("admin", "admin-password")
            .await
            .unwrap();
        assert_eq!(created.map(|u| u.role), Some(UserRole::Admin));

        let again = auth
            .ensure_bootstrap_admin("second", "admin-password")
            .await
            .unwrap();
        assert!(again.is_none());

        let tokens = auth.login("admin", "admin-password").await.unwrap();
        assert!(tokens.user.role.is_admin());
    }
}
