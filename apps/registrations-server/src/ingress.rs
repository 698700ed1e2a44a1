//! Ingress router: health endpoint, module routes and the middleware stack.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::{Extension, Router};
use registrations::client::RegistrationsApi;
use runtime::ServerConfig;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::request_id;

/// Middleware knobs taken from the `server` config section.
#[derive(Debug, Clone)]
pub struct IngressConfig {
    /// `None` disables the handler timeout.
    pub timeout: Option<Duration>,
    pub cors_enabled: bool,
    pub body_limit_bytes: usize,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for IngressConfig {
    fn from(server: &ServerConfig) -> Self {
        Self {
            timeout: (server.timeout_sec > 0).then(|| Duration::from_secs(server.timeout_sec)),
            cors_enabled: server.cors_enabled,
            body_limit_bytes: server.body_limit_bytes,
        }
    }
}

/// Liveness: 200 when the store answers a ping, 503 otherwise.
pub async fn health_check(Extension(api): Extension<Arc<dyn RegistrationsApi>>) -> Response {
    let timestamp = chrono::Utc::now().to_rfc3339();
    match api.check_store().await {
        Ok(()) => Json(json!({ "status": "healthy", "timestamp": timestamp })).into_response(),
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "message": "Registration store unavailable",
                    "timestamp": timestamp
                })),
            )
                .into_response()
        }
    }
}

/// Merge `/health` with the module routes and wrap everything in the
/// middleware stack. Layers added later run first on the way in:
/// BodyLimit -> CORS -> Timeout -> SetRequestId -> PropagateRequestId -> Trace -> extensions.
pub fn build_router(
    api_routes: Router,
    api: Arc<dyn RegistrationsApi>,
    cfg: &IngressConfig,
) -> Router {
    let health = Router::new()
        .route("/health", get(health_check))
        .layer(Extension(api));
    let mut router = health.merge(api_routes);

    // innermost first: the id must already be set when the span opens
    router = router.layer(from_fn(request_id::push_req_id_to_extensions));
    router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(request_id::make_request_span)
            .on_response(request_id::record_response),
    );
    let x_request_id = request_id::header();
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

    if let Some(timeout) = cfg.timeout {
        router = router.layer(TimeoutLayer::new(timeout));
    }
    if cfg.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }
    router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes))
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("HTTP server bound on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
