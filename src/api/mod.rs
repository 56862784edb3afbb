//! HTTP export backend
//!
//! Serves `POST /download-repo`, which runs the configured converter for a
//! repository URL and streams the produced file back as an attachment.

use crate::config::Config;
use crate::error::Result;
use crate::export::RepoExporter;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router
///
/// # Routes
///
/// - `POST /download-repo` - Export a repository and return the file
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
pub fn create_router(exporter: Arc<RepoExporter>, config: Arc<Config>) -> Router {
    let state = AppState::new(exporter, config.clone());

    let router = Router::new()
        .route("/download-repo", post(routes::download_repo))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.server.cors_enabled {
        router.layer(build_cors_layer(&config.server.cors_origins))
    } else {
        router
    }
}

/// CORS for the configured origins; `"*"` or an empty list admits any origin
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| o.parse::<HeaderValue>().ok()))
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server on the configured bind address
///
/// Runs until `shutdown` resolves; in-flight requests are allowed to finish.
///
/// # Example
///
/// ```no_run
/// use hubfetch::{Config, RepoExporter};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let exporter = Arc::new(RepoExporter::from_config(&config)?);
///
/// hubfetch::api::start_api_server(exporter, config, hubfetch::shutdown_signal()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(
    exporter: Arc<RepoExporter>,
    config: Arc<Config>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let bind_address = config.server.bind_address;

    tracing::info!(
        address = %bind_address,
        converter = exporter.converter_name(),
        "Starting API server"
    );

    let app = create_router(exporter, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
