//! Wire types for the provider's `/auth/*` endpoints

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::Session;

/// Lifetime assumed when the token endpoint omits `expires_in`
pub(crate) const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Provider-asserted identity claims (OIDC userinfo shape)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Every other claim the provider sent, preserved as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    pub fn new(sub: impl Into<String>, email: Option<String>) -> Self {
        Self {
            sub: sub.into(),
            email,
            extra: serde_json::Map::new(),
        }
    }
}

/// Outcome of `verify_token`
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub valid: bool,
    pub claims: Option<Claims>,
}

impl Verification {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            claims: None,
        }
    }

    pub fn valid(claims: Claims) -> Self {
        Self {
            valid: true,
            claims: Some(claims),
        }
    }
}

/// Raw `/auth/token` reply. Every field is optional so a malformed reply
/// surfaces as a typed error instead of a serde failure.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenReply {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl TokenReply {
    /// Convert into a session, naming the first missing token.
    /// `wrap` picks the error variant for the calling operation.
    pub fn into_session(
        self,
        now: DateTime<Utc>,
        wrap: fn(String) -> Error,
    ) -> Result<Session> {
        let access_token =
            non_empty(self.access_token).ok_or_else(|| wrap(missing("access_token")))?;
        let refresh_token =
            non_empty(self.refresh_token).ok_or_else(|| wrap(missing("refresh_token")))?;
        let id_token = non_empty(self.id_token).ok_or_else(|| wrap(missing("id_token")))?;
        let expires_in = self
            .expires_in
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        Ok(Session {
            access_token,
            refresh_token,
            id_token,
            expires_at: now + Duration::seconds(expires_in),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn missing(field: &str) -> String {
    format!("provider reply is missing {}", field)
}

/// Raw `/auth/verify` reply
#[derive(Debug, Deserialize)]
pub(crate) struct VerifyReply {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub claims: Option<Claims>,
}

impl From<VerifyReply> for Verification {
    fn from(reply: VerifyReply) -> Self {
        if reply.valid {
            Self {
                valid: true,
                claims: reply.claims,
            }
        } else {
            Self::invalid()
        }
    }
}
