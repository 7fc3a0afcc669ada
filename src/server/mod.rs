// Server module - axum HTTP surface over the generation pipeline

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, MatchedPath, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::QrBuilderError;
use crate::metrics::ServiceMetrics;
use crate::pipeline::QrBuilder;

pub mod error;
pub mod form;
pub mod handlers;

pub use error::ApiError;
pub use form::{FormData, FormPart};

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub builder: QrBuilder,
    pub metrics: ServiceMetrics,
    /// QR edge used when a request omits `size`
    pub default_size: i64,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config) -> prometheus::Result<Self> {
        Ok(Self {
            builder: QrBuilder::new(&config.render, &config.artistic),
            metrics: ServiceMetrics::new()?,
            default_size: config.render.default_size as i64,
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }

    /// Run CPU-bound pipeline work on the blocking pool, timing it under `operation`.
    pub async fn run<T, F>(&self, operation: &'static str, work: F) -> Result<T, ApiError>
    where
        F: FnOnce(&QrBuilder) -> crate::error::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let builder = self.builder.clone();
        let timer = self.metrics.start_render_timer(operation);
        let result = tokio::task::spawn_blocking(move || work(&builder))
            .await
            .map_err(|e| QrBuilderError::internal(format!("{} task failed: {}", operation, e)))?;
        timer.observe_duration();
        Ok(result?)
    }
}

/// Count every routed request by matched path and response status.
async fn track_requests(
    State(state): State<AppState>,
    matched: Option<MatchedPath>,
    req: Request,
    next: Next,
) -> Response {
    let endpoint = matched
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let response = next.run(req).await;
    state
        .metrics
        .record_request(&endpoint, response.status().as_u16());
    response
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/styles", get(handlers::styles))
        .route("/metrics", get(handlers::metrics))
        .route("/qr", post(handlers::create_qr))
        .route("/qr/logo", post(handlers::create_qr_with_logo))
        .route("/qr/text", post(handlers::create_qr_with_text))
        .route("/qr/artistic", post(handlers::create_artistic_qr))
        .route("/qr/qart", post(handlers::create_qart))
        .route("/embed", post(handlers::embed_qr))
        .route("/batch/embed", post(handlers::batch_embed))
        .route("/batch/artistic", post(handlers::batch_artistic))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `server.address:server.port` and serve until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = AppState::new(&config).context("Failed to register metrics")?;
    tracing::info!(
        artistic_codec = state.builder.artistic_codec_name(),
        optimize_png = config.render.optimize_png,
        "Pipeline ready"
    );

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
