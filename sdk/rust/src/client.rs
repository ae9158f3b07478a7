//! Identity provider client
//!
//! Endpoints (relative to the provider base URL):
//!
//! | Operation | Request |
//! |-----------|---------|
//! | authorize | `GET /auth/authorize?client_id&redirect_uri&response_type=code&state` |
//! | exchange / refresh | `POST /auth/token` (form, `grant_type` = `authorization_code` or `refresh_token`) |
//! | verify | `POST /auth/verify` (bearer + `{"token": ...}`) |
//! | userinfo | `GET /auth/userinfo` (bearer) |
//! | logout | `POST /auth/logout` (bearer) |

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{StatusCode, Url};

use crate::error::{Error, Result};
use crate::session::Session;
use crate::types::{Claims, TokenReply, Verification, VerifyReply};

const AUTHORIZE_PATH: &str = "/auth/authorize";
const TOKEN_PATH: &str = "/auth/token";
const VERIFY_PATH: &str = "/auth/verify";
const USERINFO_PATH: &str = "/auth/userinfo";
const LOGOUT_PATH: &str = "/auth/logout";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Operations the rest of the system needs from the identity provider.
///
/// [`ProviderClient`] is the HTTP implementation; the trait exists so the
/// gateway middleware and [`crate::SessionManager`] can run against fakes.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn authorization_url(&self, state: &str) -> Result<Url>;

    async fn exchange_code_for_tokens(&self, code: &str) -> Result<Session>;

    /// Single attempt; callers must not retry a rejected refresh
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session>;

    async fn verify_token(&self, access_token: &str) -> Result<Verification>;

    async fn fetch_user_info(&self, access_token: &str) -> Result<Claims>;

    async fn logout(&self, access_token: &str) -> Result<()>;
}

/// Provider connection settings
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub client_id: String,
    /// Sent as `client_secret` on token requests when set
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: redirect_uri.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Build the provider's authorization URL. Pure construction.
pub fn build_authorization_url(
    base_url: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> Result<Url> {
    let mut url = endpoint(base_url, AUTHORIZE_PATH)?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("state", state);
    Ok(url)
}

fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let base =
        Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!(
            "{}: scheme must be http or https",
            base_url
        )));
    }
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&joined).map_err(|e| Error::InvalidUrl(format!("{}: {}", joined, e)))
}

/// HTTP client for the Kush.Observer provider
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        // Validate the base URL up front so misconfiguration fails at startup
        endpoint(&config.base_url, TOKEN_PATH)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("kush-observer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn url(&self, path: &str) -> Result<Url> {
        endpoint(&self.config.base_url, path)
    }

    async fn post_token(&self, params: &[(&str, &str)]) -> Result<reqwest::Response> {
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("client_id", self.config.client_id.as_str()));
        if let Some(secret) = self.config.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }

        Ok(self
            .http
            .post(self.url(TOKEN_PATH)?)
            .form(&form)
            .send()
            .await?)
    }
}

#[async_trait]
impl IdentityProvider for ProviderClient {
    fn authorization_url(&self, state: &str) -> Result<Url> {
        build_authorization_url(
            &self.config.base_url,
            &self.config.client_id,
            &self.config.redirect_uri,
            state,
        )
    }

    async fn exchange_code_for_tokens(&self, code: &str) -> Result<Session> {
        let response = self
            .post_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = %status, "Token exchange rejected by provider");
            return Err(Error::TokenExchange(format!(
                "provider returned {}",
                status
            )));
        }

        let reply: TokenReply = response
            .json()
            .await
            .map_err(|e| Error::TokenExchange(format!("malformed reply: {}", e)))?;
        let session = reply.into_session(Utc::now(), Error::TokenExchange)?;
        tracing::debug!(expires_at = %session.expires_at, "Authorization code exchanged");
        Ok(session)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        let response = self
            .post_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = %status, "Refresh token rejected by provider");
            return Err(Error::Refresh(format!("provider returned {}", status)));
        }

        let reply: TokenReply = response
            .json()
            .await
            .map_err(|e| Error::Refresh(format!("malformed reply: {}", e)))?;
        let session = reply.into_session(Utc::now(), Error::Refresh)?;
        tracing::debug!(expires_at = %session.expires_at, "Session refreshed");
        Ok(session)
    }

    async fn verify_token(&self, access_token: &str) -> Result<Verification> {
        let response = self
            .http
            .post(self.url(VERIFY_PATH)?)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "token": access_token }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(Verification::invalid());
        }
        if !status.is_success() {
            return Err(Error::Verify(format!("provider returned {}", status)));
        }

        let reply: VerifyReply = response
            .json()
            .await
            .map_err(|e| Error::Verify(format!("malformed reply: {}", e)))?;
        Ok(reply.into())
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<Claims> {
        let response = self
            .http
            .get(self.url(USERINFO_PATH)?)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UserInfo(format!("provider returned {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::UserInfo(format!("malformed reply: {}", e)))
    }

    async fn logout(&self, access_token: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url(LOGOUT_PATH)?)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Provider logout returned non-success");
        }
        Ok(())
    }
}
