//! Authentication API endpoints
//!
//! Browser login (`/login` then `/callback`), programmatic token grants
//! (`/token`), a non-refreshing status probe and logout.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use kush_observer::{IdentityProvider, Session};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::auth::state::{StateError, create_state_token, validate_state_token};
use crate::api::auth::{
    AuthFailure, AuthFailureKind, AuthUser, CredentialSource, Credentials, SessionCookies,
    credentials, resolve_identity,
};
use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, ApiResponse};
use crate::core::constants::OAUTH_STATE_COOKIE_NAME;
use crate::utils::crypto::constant_time_eq;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginQuery {
    /// Local path to return to after sign-in
    #[validate(length(max = 2048, message = "return_to is too long"))]
    pub return_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TokenRequest {
    pub grant_type: GrantType,
    #[validate(length(min = 1, message = "code cannot be empty"))]
    pub code: Option<String>,
    /// Falls back to the refresh cookie when omitted
    #[validate(length(min = 1, message = "refresh_token cannot be empty"))]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub id_token: String,
    pub expires_at: DateTime<Utc>,
    pub token_type: &'static str,
}

impl From<&Session> for TokenResponse {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            id_token: session.id_token.clone(),
            expires_at: session.expires_at,
            token_type: "Bearer",
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}

/// State for auth routes
#[derive(Clone)]
pub struct AuthRoutesState {
    pub provider: Arc<dyn IdentityProvider>,
    pub cookies: SessionCookies,
    /// HMAC key for OAuth state tokens
    pub state_key: Arc<Vec<u8>>,
}

/// Create auth routes
pub fn routes(state: AuthRoutesState) -> Router {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/token", post(token))
        .route("/status", get(auth_status))
        .route("/logout", post(logout))
        .with_state(state)
}

/// Start the browser sign-in flow
#[utoipa::path(
    get,
    path = "/api/v1/auth/login",
    tag = "auth",
    params(
        ("return_to" = Option<String>, Query, description = "Local path to return to after sign-in")
    ),
    responses(
        (status = 303, description = "Redirect to the identity provider"),
        (status = 400, description = "Invalid query")
    )
)]
pub async fn login(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    ValidatedQuery(query): ValidatedQuery<LoginQuery>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let token = create_state_token(&state.state_key, query.return_to.as_deref())
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let url = state
        .provider
        .authorization_url(&token)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok((
        state.cookies.issue_state(jar, token),
        Redirect::to(url.as_str()),
    ))
}

/// Complete the browser sign-in flow
#[utoipa::path(
    get,
    path = "/api/v1/auth/callback",
    tag = "auth",
    params(
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "Signed state issued by /login"),
        ("error" = Option<String>, Query, description = "Provider error code")
    ),
    responses(
        (status = 303, description = "Signed in, redirect to the original page"),
        (status = 400, description = "Missing or invalid state"),
        (status = 401, description = "Code exchange failed", body = crate::api::types::ErrorResponse),
        (status = 502, description = "Identity provider unavailable", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn callback(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<(CookieJar, Redirect), ApiError> {
    if let Some(error) = query.error {
        let detail = match query.error_description {
            Some(description) => format!("{}: {}", error, description),
            None => error,
        };
        return Err(AuthFailure::new(AuthFailureKind::TokenExchangeFailed, detail).into());
    }

    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        return Err(ApiError::bad_request(
            "MISSING_PARAMETER",
            "code and state are required",
        ));
    };

    let expected = jar
        .get(OAUTH_STATE_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::bad_request("INVALID_STATE", "No sign-in in progress"))?;
    if !constant_time_eq(&expected, &returned_state) {
        return Err(ApiError::bad_request("INVALID_STATE", "State mismatch"));
    }
    let claims = validate_state_token(&returned_state, &state.state_key).map_err(|e| match e {
        StateError::Expired => ApiError::bad_request("STATE_EXPIRED", "Sign-in took too long"),
        other => ApiError::bad_request("INVALID_STATE", other.to_string()),
    })?;

    let session = state
        .provider
        .exchange_code_for_tokens(&code)
        .await
        .map_err(|e| AuthFailure::from_provider(AuthFailureKind::TokenExchangeFailed, &e))?;

    let resolved = resolve_identity(
        state.provider.as_ref(),
        Credentials {
            access_token: session.access_token.clone(),
            refresh_token: None,
            source: CredentialSource::Cookie,
        },
    )
    .await?;
    tracing::info!(user_id = %resolved.user.id, "User signed in");

    let jar = state.cookies.issue(jar, &session);
    let jar = state.cookies.clear_state(jar);
    Ok((jar, Redirect::to(&claims.return_to)))
}

/// Exchange an authorization code or refresh token for a new token triple
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    tag = "auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "New token triple"),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Grant rejected", body = crate::api::types::ErrorResponse),
        (status = 502, description = "Identity provider unavailable", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn token(
    State(state): State<AuthRoutesState>,
    headers: HeaderMap,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<TokenRequest>,
) -> Result<(CookieJar, ApiResponse<TokenResponse>), ApiError> {
    let session = match request.grant_type {
        GrantType::AuthorizationCode => {
            let code = request.code.ok_or_else(|| {
                ApiError::bad_request(
                    "MISSING_PARAMETER",
                    "code is required for authorization_code",
                )
            })?;
            state
                .provider
                .exchange_code_for_tokens(&code)
                .await
                .map_err(|e| AuthFailure::from_provider(AuthFailureKind::TokenExchangeFailed, &e))?
        }
        GrantType::RefreshToken => {
            let refresh_token = request
                .refresh_token
                .or_else(|| credentials::refresh_token(&headers, &jar))
                .ok_or_else(AuthFailure::missing_credentials)?;
            state
                .provider
                .refresh_session(&refresh_token)
                .await
                .map_err(|e| AuthFailure::from_provider(AuthFailureKind::RefreshRejected, &e))?
        }
    };

    let body = TokenResponse::from(&session);
    Ok((state.cookies.issue(jar, &session), ApiResponse::ok(body)))
}

/// Report whether the presented credentials are currently valid.
///
/// Verification only: this probe never refreshes.
#[utoipa::path(
    get,
    path = "/api/v1/auth/status",
    tag = "auth",
    responses(
        (status = 200, description = "Authentication status", body = AuthStatusResponse)
    )
)]
pub async fn auth_status(
    State(state): State<AuthRoutesState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> ApiResponse<AuthStatusResponse> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let anonymous = || {
        ApiResponse::ok(AuthStatusResponse {
            authenticated: false,
            version: VERSION,
            user: None,
        })
    };

    let Some(credentials) = Credentials::extract(&headers, &jar) else {
        return anonymous();
    };

    match state.provider.verify_token(&credentials.access_token).await {
        Ok(verification) if verification.valid => ApiResponse::ok(AuthStatusResponse {
            authenticated: true,
            version: VERSION,
            user: verification.claims.map(AuthUser::from),
        }),
        Ok(_) => anonymous(),
        Err(e) => {
            tracing::debug!(error = %e, "Status verification failed");
            anonymous()
        }
    }
}

/// Sign out: best-effort provider logout, then clear session cookies
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out")
    )
)]
pub async fn logout(
    State(state): State<AuthRoutesState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<LogoutResponse>) {
    if let Some(credentials) = Credentials::extract(&headers, &jar)
        && let Err(e) = state.provider.logout(&credentials.access_token).await
    {
        tracing::warn!(error = %e, "Provider logout failed, clearing local session anyway");
    }

    (
        state.cookies.clear(jar),
        ApiResponse::ok(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    )
}
