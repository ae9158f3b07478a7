//! Emergency fallback middleware
//!
//! Wraps the auth middleware. When the wrapped chain answers with an
//! [`AuthFailure`], the original request body is replayed to the legacy
//! fallback endpoint. A 2xx JSON reply is returned with status 503. When the
//! fallback fails too, the original failure goes out unchanged.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::body::{Body, Bytes, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use reqwest::Url;
use thiserror::Error;

use super::auth::AuthFailure;
use super::types::ApiError;
use crate::core::config::FallbackConfig;
use crate::core::constants::{FALLBACK_BODY_LIMIT, FALLBACK_HEADER};

/// The fallback endpoint could not produce a usable reply
#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("fallback request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("fallback returned HTTP {0}")]
    Status(u16),
    #[error("fallback returned malformed JSON: {0}")]
    Malformed(String),
}

/// Client for the legacy fallback endpoint
#[derive(Debug, Clone)]
pub struct FallbackClient {
    http: reqwest::Client,
    url: Url,
}

impl FallbackClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FallbackError> {
        let url = Url::parse(url).map_err(|e| FallbackError::Malformed(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kush-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, url })
    }

    /// Build the client when the fallback is enabled
    pub fn from_config(config: &FallbackConfig) -> Result<Option<Self>, FallbackError> {
        match (&config.url, config.enabled) {
            (Some(url), true) => {
                Self::new(url, Duration::from_secs(config.timeout_secs)).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST the original body verbatim with `X-Emergency-Fallback: 1`.
    ///
    /// The reply must be a JSON object with a boolean `success`; it is
    /// otherwise returned untouched.
    pub async fn forward(
        &self,
        body: Bytes,
        content_type: Option<HeaderValue>,
    ) -> Result<serde_json::Value, FallbackError> {
        let mut request = self
            .http
            .post(self.url.clone())
            .header(FALLBACK_HEADER, "1")
            .body(body);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FallbackError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let reply: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| FallbackError::Malformed(e.to_string()))?;
        match reply.get("success") {
            Some(serde_json::Value::Bool(_)) => Ok(reply),
            _ => Err(FallbackError::Malformed(
                "expected an object with a boolean `success`".to_string(),
            )),
        }
    }
}

/// State for the fallback middleware
#[derive(Clone)]
pub struct FallbackState {
    pub client: Arc<FallbackClient>,
}

/// Emergency fallback middleware.
///
/// Every auth failure attempts the fallback independently; there is no
/// breaker state and no suppression window.
pub async fn emergency_fallback(
    State(state): State<FallbackState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, FALLBACK_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return ApiError::bad_request("BODY_READ_ERROR", e.to_string()).into_response();
        }
    };
    let content_type = parts.headers.get(header::CONTENT_TYPE).cloned();
    let method = parts.method.clone();
    let uri = parts.uri.clone();

    let response = next
        .run(Request::from_parts(parts, Body::from(bytes.clone())))
        .await;

    let Some(failure) = response.extensions().get::<AuthFailure>().cloned() else {
        return response;
    };

    match state.client.forward(bytes, content_type).await {
        Ok(reply) => {
            tracing::warn!(
                method = %method,
                uri = %uri,
                kind = %failure.kind,
                fallback = %state.client.url(),
                "Authentication failed, served degraded response from fallback"
            );
            let mut degraded = (StatusCode::SERVICE_UNAVAILABLE, Json(reply)).into_response();
            degraded
                .headers_mut()
                .insert(FALLBACK_HEADER, HeaderValue::from_static("1"));
            degraded
        }
        Err(e) => {
            tracing::warn!(
                method = %method,
                uri = %uri,
                kind = %failure.kind,
                error = %e,
                "Fallback failed, returning original authentication failure"
            );
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::AuthFailureKind;
    use axum::Router;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    /// What the legacy endpoint saw and how it answers
    #[derive(Default)]
    struct Legacy {
        calls: AtomicUsize,
        status: u16,
        body: Mutex<Option<(String, Option<String>)>>,
    }

    async fn legacy_endpoint(
        State(legacy): State<Arc<Legacy>>,
        headers: HeaderMap,
        body: String,
    ) -> Response {
        legacy.calls.fetch_add(1, Ordering::SeqCst);
        let marker = headers
            .get(FALLBACK_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        *legacy.body.lock().unwrap() = Some((body, marker));

        match legacy.status {
            200 => Json(serde_json::json!({
                "success": true,
                "message": "served by legacy",
                "entries": [1, 2]
            }))
            .into_response(),
            201 => Json(serde_json::json!({
                "success": true,
                "message": null,
                "code": 7
            }))
            .into_response(),
            202 => Json(serde_json::json!({ "success": false, "message": 42 })).into_response(),
            203 => Json(serde_json::json!({ "message": "no success flag" })).into_response(),
            299 => "not json".into_response(),
            code => StatusCode::from_u16(code).unwrap().into_response(),
        }
    }

    /// Start a local fallback server on an ephemeral port
    async fn start_legacy(status: u16) -> (Arc<Legacy>, String) {
        let legacy = Arc::new(Legacy {
            status,
            ..Default::default()
        });
        let router = Router::new()
            .route("/kush-fallback", post(legacy_endpoint))
            .with_state(legacy.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (legacy, format!("http://{}/kush-fallback", addr))
    }

    fn app(fallback_url: &str) -> Router {
        let state = FallbackState {
            client: Arc::new(FallbackClient::new(fallback_url, Duration::from_secs(5)).unwrap()),
        };
        Router::new()
            .route(
                "/auth-fails",
                post(|| async {
                    AuthFailure::new(AuthFailureKind::InvalidOrExpiredToken, "token rejected")
                }),
            )
            .route(
                "/db-fails",
                post(|| async { ApiError::internal("database is down") }),
            )
            .route("/ok", get(|| async { "fine" }))
            .layer(axum::middleware::from_fn_with_state(
                state,
                emergency_fallback,
            ))
    }

    fn post_json(uri: &str, body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_auth_failure_with_healthy_fallback_returns_503() {
        let (legacy, url) = start_legacy(200).await;

        let response = app(&url)
            .oneshot(post_json("/auth-fails", r#"{"mood":4}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[FALLBACK_HEADER], "1");
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "served by legacy");
        assert_eq!(body["entries"], serde_json::json!([1, 2]));

        assert_eq!(legacy.calls.load(Ordering::SeqCst), 1);
        let (seen_body, marker) = legacy.body.lock().unwrap().clone().unwrap();
        assert_eq!(seen_body, r#"{"mood":4}"#);
        assert_eq!(marker.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_fallback_500_returns_original_failure() {
        let (legacy, url) = start_legacy(500).await;

        let response = app(&url)
            .oneshot(post_json("/auth-fails", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.extensions().get::<AuthFailure>().unwrap().kind,
            AuthFailureKind::InvalidOrExpiredToken
        );
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "AUTH_FAILURE");
        assert_eq!(legacy.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_fallback_reply_returns_original_failure() {
        let (_legacy, url) = start_legacy(299).await;

        let response = app(&url)
            .oneshot(post_json("/auth-fails", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_fallback_reply_passed_through_verbatim() {
        let (_legacy, url) = start_legacy(201).await;

        let response = app(&url)
            .oneshot(post_json("/auth-fails", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "success": true, "message": null, "code": 7 })
        );
    }

    #[tokio::test]
    async fn test_fallback_reply_with_numeric_message_still_served() {
        let (_legacy, url) = start_legacy(202).await;

        let response = app(&url)
            .oneshot(post_json("/auth-fails", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], 42);
    }

    #[tokio::test]
    async fn test_fallback_reply_without_success_flag_returns_original_failure() {
        let (legacy, url) = start_legacy(203).await;

        let response = app(&url)
            .oneshot(post_json("/auth-fails", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(legacy.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreachable_fallback_returns_original_failure() {
        let response = app("http://127.0.0.1:9/kush-fallback")
            .oneshot(post_json("/auth-fails", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_auth_failure_never_calls_fallback() {
        let (legacy, url) = start_legacy(200).await;

        let response = app(&url)
            .oneshot(post_json("/db-fails", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"]["code"], "INTERNAL");
        assert_eq!(legacy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let (legacy, url) = start_legacy(200).await;
        let request = axum::http::Request::builder()
            .uri("/ok")
            .body(Body::empty())
            .unwrap();

        let response = app(&url).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(legacy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_each_failure_attempts_fallback() {
        let (legacy, url) = start_legacy(500).await;
        let app = app(&url);

        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(post_json("/auth-fails", "{}"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(legacy.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_from_config() {
        let disabled = FallbackConfig {
            enabled: false,
            url: Some("https://legacy.example/kush-fallback".to_string()),
            timeout_secs: 10,
        };
        assert!(FallbackClient::from_config(&disabled).unwrap().is_none());

        let enabled = FallbackConfig {
            enabled: true,
            ..disabled
        };
        let client = FallbackClient::from_config(&enabled).unwrap().unwrap();
        assert_eq!(client.url().path(), "/kush-fallback");
    }
}
