//! Counting identity provider fake shared by router tests

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use kush_observer::{Claims, Error, IdentityProvider, Result, Session, Verification};
use reqwest::Url;

/// How the fake answers `refresh_session`
#[derive(Debug, Clone, Copy, Default)]
pub enum RefreshBehavior {
    #[default]
    Accept,
    Reject,
    Unreachable,
}

/// Tokens starting with `valid` verify; `valid-noclaims` verifies without claims.
#[derive(Default)]
pub struct FakeProvider {
    pub refresh: RefreshBehavior,
    /// Every verify call fails at the transport level
    pub down: bool,
    pub verify_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub userinfo_calls: AtomicUsize,
    pub exchange_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn with_refresh(refresh: RefreshBehavior) -> Self {
        Self {
            refresh,
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            down: true,
            ..Default::default()
        }
    }

    pub fn verifies(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn userinfos(&self) -> usize {
        self.userinfo_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.verifies()
            + self.refreshes()
            + self.userinfos()
            + self.exchange_calls.load(Ordering::SeqCst)
            + self.logout_calls.load(Ordering::SeqCst)
    }
}

pub fn claims() -> Claims {
    Claims::new("user-1", Some("ada@example.com".to_string()))
}

pub fn fresh_session(access_token: &str) -> Session {
    Session {
        access_token: access_token.to_string(),
        refresh_token: "refresh-2".to_string(),
        id_token: "id-2".to_string(),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

/// A real `reqwest` error without touching the network
pub async fn transport_error() -> Error {
    match reqwest::Client::new().get("not a url").send().await {
        Err(e) => Error::Transport(e),
        Ok(_) => unreachable!("request to an invalid URL cannot succeed"),
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorization_url(&self, state: &str) -> Result<Url> {
        kush_observer::build_authorization_url(
            "https://idp.test",
            "kush-wellness",
            "http://localhost:8787/api/v1/auth/callback",
            state,
        )
    }

    async fn exchange_code_for_tokens(&self, code: &str) -> Result<Session> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if code == "good-code" {
            Ok(fresh_session("valid-login"))
        } else {
            Err(Error::TokenExchange("provider returned 400".to_string()))
        }
    }

    async fn refresh_session(&self, _refresh_token: &str) -> Result<Session> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        match self.refresh {
            RefreshBehavior::Accept => Ok(fresh_session("valid-refreshed")),
            RefreshBehavior::Reject => Err(Error::Refresh("provider returned 401".to_string())),
            RefreshBehavior::Unreachable => Err(transport_error().await),
        }
    }

    async fn verify_token(&self, access_token: &str) -> Result<Verification> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(transport_error().await);
        }
        if access_token == "valid-noclaims" {
            Ok(Verification {
                valid: true,
                claims: None,
            })
        } else if access_token.starts_with("valid") {
            Ok(Verification::valid(claims()))
        } else {
            Ok(Verification::invalid())
        }
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<Claims> {
        self.userinfo_calls.fetch_add(1, Ordering::SeqCst);
        if access_token.starts_with("valid") {
            Ok(claims())
        } else {
            Err(Error::UserInfo("provider returned 401".to_string()))
        }
    }

    async fn logout(&self, _access_token: &str) -> Result<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
