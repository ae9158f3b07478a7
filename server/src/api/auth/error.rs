//! Classified authentication failures

use std::fmt;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::types::ErrorResponse;
use crate::core::constants::AUTH_FAILURE_CODE;

/// Why authentication failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureKind {
    /// No bearer token or session cookie on the request
    MissingCredentials,
    /// The provider rejected the access token and no refresh was possible
    InvalidOrExpiredToken,
    /// The one refresh attempt was rejected
    RefreshRejected,
    /// Claims could not be fetched from the userinfo endpoint
    UserInfoFetchFailed,
    /// The authorization code could not be exchanged
    TokenExchangeFailed,
    /// The identity provider could not be reached or answered with an error
    ProviderUnavailable,
}

impl AuthFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "MissingCredentials",
            Self::InvalidOrExpiredToken => "InvalidOrExpiredToken",
            Self::RefreshRejected => "RefreshRejected",
            Self::UserInfoFetchFailed => "UserInfoFetchFailed",
            Self::TokenExchangeFailed => "TokenExchangeFailed",
            Self::ProviderUnavailable => "ProviderUnavailable",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::ProviderUnavailable => StatusCode::BAD_GATEWAY,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl fmt::Display for AuthFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authentication failure.
///
/// The rendered response carries a clone of this value in its extensions.
/// Outer middleware dispatches on that marker instead of on message text.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {detail}")]
pub struct AuthFailure {
    pub kind: AuthFailureKind,
    pub detail: String,
}

impl AuthFailure {
    pub fn new(kind: AuthFailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn missing_credentials() -> Self {
        Self::new(
            AuthFailureKind::MissingCredentials,
            "No bearer token or session cookie",
        )
    }

    /// Classify a provider error, mapping transport errors to `ProviderUnavailable`
    pub fn from_provider(kind: AuthFailureKind, error: &kush_observer::Error) -> Self {
        if error.is_transport() {
            Self::new(AuthFailureKind::ProviderUnavailable, error.to_string())
        } else {
            Self::new(kind, error.to_string())
        }
    }

    /// Message shown to clients; provider details stay in the logs
    fn public_message(&self) -> &'static str {
        match self.kind {
            AuthFailureKind::MissingCredentials => "Authentication required",
            AuthFailureKind::InvalidOrExpiredToken => "Invalid or expired credentials",
            AuthFailureKind::RefreshRejected => "Session expired, sign in again",
            AuthFailureKind::UserInfoFetchFailed => "Could not load user profile",
            AuthFailureKind::TokenExchangeFailed => "Sign-in could not be completed",
            AuthFailureKind::ProviderUnavailable => "Identity provider unavailable",
        }
    }
}

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        tracing::debug!(kind = %self.kind, detail = %self.detail, "Authentication failed");

        let status = self.kind.status();
        let body = ErrorResponse::new(
            AUTH_FAILURE_CODE,
            Some(self.kind.to_string()),
            self.public_message(),
        );
        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response.extensions_mut().insert(self);
        response
    }
}
