//! HTTP server for the transcript service.
//!
//! Provides:
//! - `GET  /`                - health check
//! - `GET  /transcript`      - transcript by `videoId` query parameter
//! - `POST /transcript`      - transcript by `videoId` JSON field
//! - `GET|POST /api/transcript` - function-style endpoint (see [`function`])

pub mod function;
pub mod handlers;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::fetchers::TranscriptFetcher;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn TranscriptFetcher>,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn TranscriptFetcher>) -> Self {
        Self { fetcher }
    }
}

/// Full service router: health, service endpoint and function endpoint
pub fn router(fetcher: Arc<dyn TranscriptFetcher>) -> Router {
    let app = Router::new()
        .route("/", get(handlers::health))
        .route(
            "/transcript",
            get(handlers::transcript_get).post(handlers::transcript_post),
        )
        .merge(function::routes())
        .with_state(AppState::new(fetcher));

    with_layers(app)
}

/// Tracing, CORS and an unconditional `Access-Control-Allow-Origin: *`
pub(crate) fn with_layers(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(SetResponseHeaderLayer::if_not_present(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(cors),
    )
}

pub struct ApiServer {
    address: String,
    function_only: bool,
    fetcher: Arc<dyn TranscriptFetcher>,
}

impl ApiServer {
    pub fn new(config: &Config, fetcher: Arc<dyn TranscriptFetcher>) -> Self {
        Self {
            address: config.bind_address(),
            function_only: false,
            fetcher,
        }
    }

    /// Serve only the function endpoint
    pub fn function_only(mut self, function_only: bool) -> Self {
        self.function_only = function_only;
        self
    }

    pub async fn start(self) -> Result<()> {
        let app = if self.function_only {
            function::app(self.fetcher)
        } else {
            router(self.fetcher)
        };

        let listener = tokio::net::TcpListener::bind(&self.address)
            .await
            .with_context(|| format!("Failed to bind {}", self.address))?;

        info!("Transcript service listening on http://{}", self.address);
        info!("Endpoints:");
        if !self.function_only {
            info!("  GET  /                - Health check");
            info!("  GET  /transcript      - Transcript by ?videoId=");
            info!("  POST /transcript      - Transcript by {{\"videoId\": ...}}");
        }
        info!("  GET  {}  - Function endpoint", function::FUNCTION_PATH);
        info!("  POST {}  - Function endpoint", function::FUNCTION_PATH);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Transcript service stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested, draining connections"),
        Err(e) => {
            warn!("Could not listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
