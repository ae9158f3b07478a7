//! Endpoints for the signed-in user
//!
//! Mounted behind the auth middleware; handlers read the attached
//! [`AuthContext`] and never see raw credentials.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use kush_observer::IdentityProvider;

use crate::api::auth::{AuthContext, AuthFailure, AuthFailureKind, AuthUser};
use crate::api::types::{ApiError, ApiResponse};

/// Create routes for the current user
pub fn routes(provider: Arc<dyn IdentityProvider>) -> Router {
    Router::new()
        .route("/", get(me))
        .route("/userinfo", get(userinfo))
        .with_state(provider)
}

/// Current user as verified by the identity provider
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "me",
    responses(
        (status = 200, description = "Authenticated user"),
        (status = 401, description = "Not authenticated", body = crate::api::types::ErrorResponse),
        (status = 503, description = "Served by the emergency fallback")
    )
)]
pub async fn me(ctx: AuthContext) -> ApiResponse<AuthUser> {
    ApiResponse::ok(ctx.user)
}

/// Fresh profile from the provider's userinfo endpoint
#[utoipa::path(
    get,
    path = "/api/v1/me/userinfo",
    tag = "me",
    responses(
        (status = 200, description = "Userinfo claims"),
        (status = 401, description = "Not authenticated or userinfo rejected", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn userinfo(
    State(provider): State<Arc<dyn IdentityProvider>>,
    ctx: AuthContext,
) -> Result<ApiResponse<AuthUser>, ApiError> {
    let claims = provider
        .fetch_user_info(&ctx.access_token)
        .await
        .map_err(|e| AuthFailure::from_provider(AuthFailureKind::UserInfoFetchFailed, &e))?;
    Ok(ApiResponse::ok(AuthUser::from(claims)))
}
