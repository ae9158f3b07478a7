//! OpenAPI specification

use axum::http::header;
use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::auth::AuthUser;
use crate::api::routes::{auth, health, me};
use crate::api::types::{ErrorBody, ErrorResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kush Gateway API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Authentication gateway for Kush.Observer"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Sign-in, token grants and logout"),
        (name = "me", description = "The authenticated user")
    ),
    paths(
        // Health
        health::health,
        // Auth
        auth::login,
        auth::callback,
        auth::token,
        auth::auth_status,
        auth::logout,
        // Me
        me::me,
        me::userinfo,
    ),
    components(schemas(
        // API types
        ErrorBody,
        ErrorResponse,
        // Health
        health::HealthResponse,
        // Auth
        AuthUser,
        auth::GrantType,
        auth::TokenRequest,
        auth::TokenResponse,
        auth::AuthStatusResponse,
        auth::LogoutResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}
