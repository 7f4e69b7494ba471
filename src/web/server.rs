//! Axum web server for SchemaLens.

use std::future::Future;
use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers;
use crate::config::Settings;
use crate::discovery::{Discovery, DiscoveryDefaults, DiscoveryService, LiveConnector};
use crate::export::{Exporter, EXPORT_ROUTE};
use crate::store::ProfileStore;

/// Application state shared across handlers
pub struct AppState {
    pub service: DiscoveryService,
    pub profiles: Arc<ProfileStore>,
}

impl AppState {
    /// Live state from settings: real drivers, the on-disk profile store and
    /// the configured export directory.
    pub fn from_settings(settings: &Settings) -> Result<Self, Box<dyn std::error::Error>> {
        let profiles = Arc::new(ProfileStore::open(settings.store.resolved_path()?)?);
        let discovery = Discovery::new(
            DiscoveryDefaults::from_settings(settings)?,
            Arc::new(LiveConnector),
            profiles.clone(),
        );
        let exporter = Exporter::new(&settings.export.dir);

        Ok(Self {
            service: DiscoveryService::new(discovery, exporter),
            profiles,
        })
    }
}

/// Build the axum router with all routes
pub fn router(state: Arc<AppState>, allow_origins: &[String]) -> Router {
    let exports = ServeDir::new(state.service.exporter().dir());

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/schema/sample", get(handlers::get_sample))
        .route("/api/schema/mysql", post(handlers::discover_mysql))
        .route("/api/schema/mongo", post(handlers::discover_mongo))
        .route("/api/connections", get(handlers::list_connections))
        .route("/api/connections", post(handlers::create_connection))
        .route("/api/connections/{id}", delete(handlers::delete_connection))
        .nest_service(EXPORT_ROUTE, exports)
        .layer(cors_layer(allow_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for the configured origins. `*` allows any origin.
fn cors_layer(allow_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allow_origins.is_empty() || allow_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allow_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Start the web server
pub async fn serve(
    settings: Settings,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::from_settings(&settings)?);
    let app = router(state, &settings.server.allow_origins_list());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        %addr,
        exports = %settings.export.dir.display(),
        "SchemaLens listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. If the signal cannot be installed the
/// server runs until killed.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("shutting down"),
        Err(e) => {
            warn!(error = %e, "cannot listen for ctrl-c, graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
    }
}
