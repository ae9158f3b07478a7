//! # Kush.Observer
//!
//! Client for the Kush.Observer identity provider and the session store
//! used by applications that sign in through it.
//!
//! - [`ProviderClient`] talks to the provider's `/auth/*` endpoints:
//!   authorization URLs, code exchange, refresh, verification, userinfo.
//! - [`SessionStore`] keeps the single active [`Session`] (token triple plus
//!   absolute expiry). [`MemorySessionStore`] and [`FileSessionStore`] are
//!   provided.
//! - [`SessionManager`] ties the two together: it checks expiry before every
//!   use of the access token and refreshes at most once per call.
//!
//! ```no_run
//! # async fn demo() -> kush_observer::Result<()> {
//! use std::sync::Arc;
//! use kush_observer::{MemorySessionStore, ProviderClient, ProviderConfig, SessionManager};
//!
//! let provider = ProviderClient::new(ProviderConfig::new(
//!     "https://kush.observer",
//!     "kush-wellness",
//!     "http://localhost:8787/api/v1/auth/callback",
//! ))?;
//! let manager = SessionManager::new(Arc::new(provider), Arc::new(MemorySessionStore::new()));
//! let url = manager.login_url("opaque-state")?;
//! println!("sign in at {url}");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod manager;
mod session;
mod types;

pub use client::{
    IdentityProvider, ProviderClient, ProviderConfig, build_authorization_url,
};
pub use error::{Error, Result};
pub use manager::SessionManager;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore, is_expired};
pub use types::{Claims, Verification};
