use crate::allowlist::Allowlist;
use analytics::PerformanceReport;
use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use configuration::Settings;
use engine::PerformanceEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tokio::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod allowlist;
pub mod error;
pub mod handlers;
pub mod refresh;
pub mod signal;

/// The shared application state that all handlers can access.
#[derive(Debug)]
pub struct AppState {
    pub allowlist: Allowlist,
    /// The latest report, `None` until the first refresh completes.
    pub report: RwLock<Option<PerformanceReport>>,
}

impl AppState {
    pub fn new(allowlist: Allowlist) -> Self {
        Self {
            allowlist,
            report: RwLock::new(None),
        }
    }
}

/// Builds the application routes around `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/append-email", post(handlers::append_email))
        .route("/api/check-email", post(handlers::check_email))
        .route("/api/performance", get(handlers::get_performance))
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
///
/// Runs until Ctrl-C, which also stops the background refresh.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let engine = PerformanceEngine::from_settings(&settings)
        .context("Failed to build the performance engine")?;
    let engine = Arc::new(engine);
    let state = Arc::new(AppState::new(Allowlist::new(
        settings.server.allowlist_path.clone(),
    )));

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let refresher = tokio::spawn(refresh::run_refresh_loop(
        Arc::clone(&engine),
        Arc::clone(&state),
        Duration::from_secs(settings.server.refresh_interval_secs),
        shutdown_rx,
    ));

    let listen = format!("{}:{}", settings.server.host, settings.server.port);
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid listen address {listen}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            signal::ctrl_c().await;
            tracing::info!("Shutdown signal received.");
            let _ = shutdown_tx.send(());
        })
        .await?;

    refresher.await.context("Refresh task panicked")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use core_types::SeriesState;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(dir: &tempfile::TempDir) -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(Allowlist::new(dir.path().join("emails.csv"))));
        (router(Arc::clone(&state)), state)
    }

    async fn post(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_check_answers_ok() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(&dir);
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn append_then_check_email() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(&dir);

        let (status, body) = post(app.clone(), "/api/check-email", r#"{"email":"a@b.com"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "authorized": false }));

        let (status, body) =
            post(app.clone(), "/api/append-email", r#"{"email":" A@B.com "}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Email added" }));

        let (_, body) = post(app.clone(), "/api/append-email", r#"{"email":"a@b.com"}"#).await;
        assert_eq!(body, json!({ "message": "Email already present" }));

        let (_, body) = post(app, "/api/check-email", r#"{"email":"A@B.COM"}"#).await;
        assert_eq!(body, json!({ "authorized": true }));
    }

    #[tokio::test]
    async fn malformed_bodies_are_invalid_emails() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(&dir);

        for body in [r#"{"email":42}"#, r#"{}"#, r#"{"email":"   "}"#, "not json"] {
            let (status, json_body) = post(app.clone(), "/api/append-email", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(json_body, json!({ "error": "Invalid email" }));
        }
    }

    #[tokio::test]
    async fn unreadable_allowlist_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState::new(Allowlist::new(dir.path())));

        let (status, body) =
            post(router(state), "/api/append-email", r#"{"email":"a@b.com"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Could not read emails file" }));
    }

    #[tokio::test]
    async fn performance_is_unavailable_until_first_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let (app, state) = app(&dir);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/performance").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let settings = configuration::MetricsSettings::default();
        let engine = analytics::AnalyticsEngine::new(&settings).unwrap();
        let pending = SeriesState::Pending;
        let report = engine.calculate(&pending, &pending, &pending);
        *state.report.write().await = Some(report);

        let response = app
            .oneshot(Request::builder().uri("/api/performance").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["snapshot"]["daily_var"]["state"], "pending");
    }
}
