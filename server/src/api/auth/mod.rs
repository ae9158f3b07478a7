//! Authentication module

mod context;
pub mod cookies;
pub mod credentials;
mod error;
pub mod middleware;
pub mod state;

pub use context::{AuthContext, AuthUser};
pub use cookies::SessionCookies;
pub use credentials::{CredentialSource, Credentials};
pub use error::{AuthFailure, AuthFailureKind};
pub use middleware::{AuthState, ResolvedIdentity, require_auth, resolve_identity};
