//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::analytics::{self, AnalyticsApiState};
use super::routes::health;
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::core::storage::DataSubdir;

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        // Debug directory is created by storage init when debug mode is on
        let debug_dir = app
            .config
            .debug
            .then(|| app.storage.subdir(DataSubdir::Debug));

        let state = AnalyticsApiState {
            repo: Arc::new(app.duckdb.clone()),
            cache: app.cache.clone(),
            debug_dir,
        };
        let router = build_router(state, &allowed_origins);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "HTTP server listening");
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}

/// Assemble the full router with shared layers
pub fn build_router(state: AnalyticsApiState, allowed_origins: &AllowedOrigins) -> Router {
    let repo = Arc::clone(&state.repo);
    Router::new()
        .route("/api/v1/health", get(health::health).with_state(repo))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .nest("/api/v1/analytics", analytics::routes(state))
        .fallback(middleware::handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}
