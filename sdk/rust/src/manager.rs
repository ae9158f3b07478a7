//! Session lifecycle on top of a provider and a store

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Url;

use crate::client::IdentityProvider;
use crate::error::{Error, Result};
use crate::session::{Session, SessionStore};
use crate::types::Claims;

/// Owns the single active session of an application.
///
/// Every use of the access token goes through [`SessionManager::access_token`],
/// which checks `expires_at` first. A refresh is attempted at most once per
/// call and a rejected refresh discards the session.
#[derive(Clone)]
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn SessionStore>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn SessionStore>) -> Self {
        Self { provider, store }
    }

    pub fn login_url(&self, state: &str) -> Result<Url> {
        self.provider.authorization_url(state)
    }

    /// Finish the authorization-code flow: exchange, verify, persist
    pub async fn complete_login(&self, code: &str) -> Result<Claims> {
        let session = self.provider.exchange_code_for_tokens(code).await?;
        let claims = self.verified_claims(&session.access_token).await?;
        self.store.save(&session)?;
        tracing::debug!(sub = %claims.sub, "Login completed");
        Ok(claims)
    }

    /// Current access token, refreshed once if expired at `now`
    pub async fn access_token(&self, now: DateTime<Utc>) -> Result<String> {
        let session = self.store.load()?.ok_or(Error::NoSession)?;
        if !session.is_expired(now) {
            return Ok(session.access_token);
        }

        tracing::debug!(expires_at = %session.expires_at, "Access token expired, refreshing");
        let refreshed = self.refresh_once(&session).await?;
        Ok(refreshed.access_token)
    }

    /// Re-validate a stored session, e.g. when an application starts.
    ///
    /// Returns `Ok(None)` when nothing is stored. An invalid token triggers
    /// one refresh followed by one more verification.
    pub async fn restore(&self) -> Result<Option<Claims>> {
        let Some(session) = self.store.load()? else {
            return Ok(None);
        };

        let verification = self.provider.verify_token(&session.access_token).await?;
        if verification.valid {
            return self.claims_from(verification.claims, &session.access_token).await.map(Some);
        }

        let refreshed = self.refresh_once(&session).await?;
        match self.verified_claims(&refreshed.access_token).await {
            Ok(claims) => Ok(Some(claims)),
            Err(e) => {
                self.store.clear()?;
                Err(e)
            }
        }
    }

    /// Provider logout is best effort; the local session is always cleared
    pub async fn logout(&self) -> Result<()> {
        if let Some(session) = self.store.load()?
            && let Err(e) = self.provider.logout(&session.access_token).await
        {
            tracing::warn!(error = %e, "Provider logout failed, clearing local session anyway");
        }
        self.store.clear()
    }

    async fn refresh_once(&self, session: &Session) -> Result<Session> {
        match self.provider.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => {
                self.store.save(&refreshed)?;
                Ok(refreshed)
            }
            Err(e) => {
                tracing::info!(error = %e, "Refresh failed, clearing session");
                self.store.clear()?;
                Err(e)
            }
        }
    }

    async fn verified_claims(&self, access_token: &str) -> Result<Claims> {
        let verification = self.provider.verify_token(access_token).await?;
        if !verification.valid {
            return Err(Error::Verify("provider rejected the access token".to_string()));
        }
        self.claims_from(verification.claims, access_token).await
    }

    /// Verify replies may omit claims; fall back to userinfo
    async fn claims_from(&self, claims: Option<Claims>, access_token: &str) -> Result<Claims> {
        match claims {
            Some(claims) => Ok(claims),
            None => self.provider.fetch_user_info(access_token).await,
        }
    }
}
