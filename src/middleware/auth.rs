//! Bearer-token extractors.
//!
//! `AuthUser` only checks the token. `AdminUser` also loads the account and
//! requires the stored role to be admin.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::domain::{Role, User};
use crate::error::AppError;
use crate::services::AuthError;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                tracing::debug!(uri = %parts.uri, "Missing bearer token");
                AppError::from(AuthError::MissingToken)
            })?;

        let claims = state.auth.tokens().verify(token).map_err(|e| {
            tracing::warn!(uri = %parts.uri, error = %e, "Rejected bearer token");
            AppError::from(e)
        })?;

        let user = AuthUser {
            user_id: claims.sub,
            role: claims.role,
        };
        parts.extensions.insert(user);
        Ok(user)
    }
}

/// An authenticated account whose stored role is admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        let user = state
            .auth
            .current_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, uri = %parts.uri, "Admin route denied");
            return Err(AppError::Forbidden("Access denied. Admin only.".to_string()));
        }

        Ok(AdminUser(user))
    }
}
