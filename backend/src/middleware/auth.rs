//! Authentication middleware
//!
//! JWT authentication and the company access policy

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use shared::{Company, UserRole};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::AuthService;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Admins see every company; users see the ones they created
    pub fn can_access(&self, company: &Company) -> bool {
        self.is_admin() || company.is_owned_by(&self.username)
    }

    /// Owner filter to apply when listing companies
    pub fn company_scope(&self) -> Option<&str> {
        if self.is_admin() {
            None
        } else {
            Some(self.username.as_str())
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }
}

/// Authentication middleware that validates JWT tokens
/// and inserts the [`AuthUser`] into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or_else(|| {
        AppError::Unauthorized("Missing or invalid Authorization header".to_string())
    })?;

    let auth_service = AuthService::new(state.store.clone(), &state.config);
    let claims = auth_service.validate_token(bearer.token())?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        username: claims.username,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn user(username: &str, role: UserRole) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            role,
        }
    }

    fn company(owner: &str) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            data: json!({}),
            created_by: owner.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_can_access() {
        assert!(user("alice", UserRole::User).can_access(&company("alice")));
    }

    #[test]
    fn test_other_user_cannot_access() {
        assert!(!user("bob", UserRole::User).can_access(&company("alice")));
    }

    #[test]
    fn test_admin_can_access_everything() {
        assert!(user("root", UserRole::Admin).can_access(&company("alice")));
    }

    #[test]
    fn test_company_scope() {
        assert_eq!(user("alice", UserRole::User).company_scope(), Some("alice"));
        assert_eq!(user("root", UserRole::Admin).company_scope(), None);
    }

    #[test]
    fn test_require_admin() {
        assert!(user("root", UserRole::Admin).require_admin().is_ok());
        assert!(matches!(
            user("alice", UserRole::User).require_admin(),
            Err(AppError::InsufficientPermissions)
        ));
    }
}
