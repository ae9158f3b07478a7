//! API server initialization

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use kush_observer::IdentityProvider;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::auth::{AuthState, SessionCookies, require_auth};
use super::fallback::{FallbackClient, FallbackState, emergency_fallback};
use super::middleware::{self, AllowedOrigins};
use super::openapi::openapi_json;
use super::routes::auth::AuthRoutesState;
use super::routes::{auth, health, me};
use crate::core::constants::{AUTH_BODY_LIMIT, DEFAULT_BODY_LIMIT};
use crate::core::{CoreApp, Environment};

/// Everything the router needs, detached from process startup
#[derive(Clone)]
pub struct GatewayState {
    pub provider: Arc<dyn IdentityProvider>,
    pub fallback: Option<Arc<FallbackClient>>,
    pub cookies: SessionCookies,
    pub state_key: Arc<Vec<u8>>,
    pub environment: Environment,
    pub allowed_origins: AllowedOrigins,
}

impl GatewayState {
    pub fn from_app(app: &CoreApp) -> Self {
        Self {
            provider: app.provider.clone(),
            fallback: app.fallback.clone(),
            cookies: SessionCookies::new(app.config.session.secure_cookies),
            state_key: Arc::new(app.config.session.jwt_secret.clone()),
            environment: app.config.environment,
            allowed_origins: AllowedOrigins::new(
                &app.config.server.host,
                app.config.server.port,
                &app.config.server.allowed_origins,
            ),
        }
    }
}

/// Build the gateway router.
///
/// `/api/v1/me` runs Emergency Fallback, then Auth Middleware, then the
/// handler. `/api/v1/auth` runs Emergency Fallback, then the handler.
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = AuthState {
        provider: state.provider.clone(),
        cookies: state.cookies,
    };

    let me_routes = me::routes(state.provider.clone());
    let auth_routes = auth::routes(AuthRoutesState {
        provider: state.provider.clone(),
        cookies: state.cookies,
        state_key: state.state_key.clone(),
    })
    .layer(DefaultBodyLimit::max(AUTH_BODY_LIMIT));

    let (me_routes, auth_routes) = match &state.fallback {
        Some(client) => {
            let fallback = FallbackState {
                client: client.clone(),
            };
            let me_routes = me_routes.layer(
                ServiceBuilder::new()
                    .layer(axum::middleware::from_fn_with_state(
                        fallback.clone(),
                        emergency_fallback,
                    ))
                    .layer(axum::middleware::from_fn_with_state(
                        auth_state,
                        require_auth,
                    )),
            );
            let auth_routes = auth_routes.layer(axum::middleware::from_fn_with_state(
                fallback,
                emergency_fallback,
            ));
            (me_routes, auth_routes)
        }
        None => (
            me_routes.layer(axum::middleware::from_fn_with_state(
                auth_state,
                require_auth,
            )),
            auth_routes,
        ),
    };

    Router::new()
        .route(
            "/api/v1/health",
            get(health::health).with_state(state.environment),
        )
        .route("/api/openapi.json", get(openapi_json))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/me", me_routes)
        .fallback(middleware::handle_404)
        .layer(middleware::cors(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let app = self.app;
        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;

        let router = build_router(GatewayState::from_app(&app));

        let listener = TcpListener::bind((host.as_str(), port))
            .await
            .with_context(|| format!("Failed to bind {}:{}", host, port))?;
        tracing::debug!(addr = ?listener.local_addr().ok(), "Listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}
