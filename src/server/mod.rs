//! HTTP service.
//!
//! Routes:
//! - `GET /healthz`: liveness and server time.
//! - `POST /api/scrape`: render a page and return its cleaned text.
//! - `POST /api/parse`: answer a question about supplied or scraped content.
//!
//! All shared state is immutable, so requests never contend with each other.

pub mod handlers;
pub mod types;

use std::sync::Arc;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::error::{IoError, Result};
use crate::ollama::Generator;
use crate::scrape::PageScraper;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Validated settings.
    pub settings: Arc<Settings>,
    /// Inference backend.
    pub generator: Arc<dyn Generator>,
    /// Page renderer.
    pub scraper: Arc<dyn PageScraper>,
}

impl AppState {
    /// Bundles the collaborators of a running service.
    #[must_use]
    pub fn new(
        settings: Settings,
        generator: Arc<dyn Generator>,
        scraper: Arc<dyn PageScraper>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            generator,
            scraper,
        }
    }
}

/// Builds the router with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/api/scrape", post(handlers::scrape))
        .route("/api/parse", post(handlers::parse))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds `state.settings.bind` and serves until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.settings.bind;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| IoError::Generic(format!("failed to bind {addr}: {e}")))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        ollama = %state.settings.ollama_url,
        model = %state.settings.default_model,
        "server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::scrape::UnavailableScraper;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn generate(
            &self,
            model: &str,
            _prompt: &str,
        ) -> std::result::Result<String, GenerationError> {
            Ok(format!("answer from {model}"))
        }
    }

    fn test_state() -> AppState {
        AppState::new(
            Settings::default(),
            Arc::new(EchoGenerator),
            Arc::new(UnavailableScraper),
        )
    }

    #[tokio::test]
    async fn test_healthz() {
        let response = router(test_state())
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 10_000).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["ok"], true);
        assert!(json["time"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/parse")
            .header("origin", "http://localhost:4200")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let response = router(test_state()).oneshot(request).await.unwrap();

        assert!(response.status().is_success());
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("POST"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = router(test_state())
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
