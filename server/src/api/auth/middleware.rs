//! Authentication middleware
//!
//! Per request: extract credentials, verify them with the identity provider
//! (refreshing at most once), then attach an [`AuthContext`].

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use kush_observer::{Claims, IdentityProvider, Session};

use super::context::{AuthContext, AuthUser};
use super::cookies::SessionCookies;
use super::credentials::Credentials;
use super::error::{AuthFailure, AuthFailureKind};

/// Shared auth state for middleware
#[derive(Clone)]
pub struct AuthState {
    pub provider: Arc<dyn IdentityProvider>,
    pub cookies: SessionCookies,
}

/// Outcome of a successful identity resolution
#[derive(Debug)]
pub struct ResolvedIdentity {
    pub user: AuthUser,
    pub access_token: String,
    /// The new session when the one refresh attempt was used
    pub refreshed: Option<Session>,
}

/// Authentication middleware
///
/// Injects `AuthContext` into request extensions. When the access token had
/// to be refreshed, the new session cookies are set on the response.
pub async fn require_auth(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthFailure> {
    let credentials =
        Credentials::extract(request.headers(), &jar).ok_or_else(AuthFailure::missing_credentials)?;
    let source = credentials.source;

    let resolved = resolve_identity(state.provider.as_ref(), credentials).await?;
    tracing::debug!(
        user_id = %resolved.user.id,
        source = ?source,
        refreshed = resolved.refreshed.is_some(),
        "Request authenticated"
    );

    request.extensions_mut().insert(AuthContext {
        user: resolved.user,
        access_token: resolved.access_token,
    });

    let response = next.run(request).await;
    match resolved.refreshed {
        Some(session) => Ok((state.cookies.issue(jar, &session), response).into_response()),
        None => Ok(response),
    }
}

/// Verify, refresh at most once, verify again, then build the user.
///
/// The second verification never runs concurrently with the refresh and a
/// rejected refresh is final.
pub async fn resolve_identity(
    provider: &dyn IdentityProvider,
    credentials: Credentials,
) -> Result<ResolvedIdentity, AuthFailure> {
    let verification = provider
        .verify_token(&credentials.access_token)
        .await
        .map_err(verify_failure)?;

    if verification.valid {
        let user = attach(provider, &credentials.access_token, verification.claims).await?;
        return Ok(ResolvedIdentity {
            user,
            access_token: credentials.access_token,
            refreshed: None,
        });
    }

    let Some(refresh_token) = credentials.refresh_token else {
        return Err(AuthFailure::new(
            AuthFailureKind::InvalidOrExpiredToken,
            "Access token rejected and no refresh token presented",
        ));
    };

    tracing::debug!("Access token rejected, attempting refresh");
    let session = provider
        .refresh_session(&refresh_token)
        .await
        .map_err(|e| AuthFailure::from_provider(AuthFailureKind::RefreshRejected, &e))?;

    let verification = provider
        .verify_token(&session.access_token)
        .await
        .map_err(verify_failure)?;
    if !verification.valid {
        return Err(AuthFailure::new(
            AuthFailureKind::InvalidOrExpiredToken,
            "Refreshed access token rejected",
        ));
    }

    let user = attach(provider, &session.access_token, verification.claims).await?;
    Ok(ResolvedIdentity {
        user,
        access_token: session.access_token.clone(),
        refreshed: Some(session),
    })
}

/// Verify replies may omit claims; fall back to userinfo
async fn attach(
    provider: &dyn IdentityProvider,
    access_token: &str,
    claims: Option<Claims>,
) -> Result<AuthUser, AuthFailure> {
    let claims = match claims {
        Some(claims) => claims,
        None => provider
            .fetch_user_info(access_token)
            .await
            .map_err(|e| AuthFailure::from_provider(AuthFailureKind::UserInfoFetchFailed, &e))?,
    };
    Ok(AuthUser::from(claims))
}

/// A verify call that errors (rather than answering `valid: false`) means the
/// provider itself is failing
fn verify_failure(error: kush_observer::Error) -> AuthFailure {
    AuthFailure::new(AuthFailureKind::ProviderUnavailable, error.to_string())
}
