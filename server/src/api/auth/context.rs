//! Request-scoped identity attached by the auth middleware

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use kush_observer::Claims;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::types::ApiError;

/// Caller identity derived from verified provider claims. Never persisted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    /// Every claim the provider asserted, `sub` included
    #[schema(value_type = Object)]
    pub claims: Claims,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            claims,
        }
    }
}

/// Authentication context injected into request extensions
#[derive(Clone)]
pub struct AuthContext {
    pub user: AuthUser,
    /// The access token that passed verification (after refresh, the new one)
    pub access_token: String,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthContext>().cloned().ok_or_else(|| {
            // Route mounted without the auth middleware
            ApiError::internal("Authentication context missing")
        })
    }
}
