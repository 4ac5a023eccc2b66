//! Router setup with all API routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use advisor_core::config::AdvisorConfig;
use advisor_core::error::AdvisorError;

use crate::handlers;
use crate::state::AppState;

/// Body limit for everything except image uploads.
const JSON_BODY_LIMIT: usize = 256 * 1024;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .general
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    // Base64 inflates payloads by a third; leave headroom for the JSON wrapper.
    let image_body_limit = state.config.chat.max_image_bytes + JSON_BODY_LIMIT;

    Router::new()
        .route("/", get(handlers::ui))
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/chat/reset", post(handlers::chat_reset))
        .route("/resume/review", post(handlers::resume_review))
        .route("/quiz", post(handlers::quiz))
        .route(
            "/image/analyze",
            post(handlers::image_analyze).layer(DefaultBodyLimit::max(image_body_limit)),
        )
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the API on the configured address until Ctrl-C, then clear all
/// session state.
pub async fn start_server(config: &AdvisorConfig, state: AppState) -> Result<(), AdvisorError> {
    let addr = format!("{}:{}", config.general.host, config.general.port);
    let advisor = state.advisor.clone();
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AdvisorError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Student advisor listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AdvisorError::Api(format!("Server error: {}", e)))?;

    advisor.shutdown();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
