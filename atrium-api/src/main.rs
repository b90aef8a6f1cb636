//! # Atrium API Server
//!
//! The server-side backend of the Atrium multi-tenant agency dashboard:
//! agencies manage sub-accounts, users, invitations, and activity
//! notifications through this API.
//!
//! ## Architecture
//!
//! - Tenant host routing (subdomain rewrites) wraps the whole router
//! - Session-token authentication against the external identity provider
//! - PostgreSQL as the single system of record; all cross-request
//!   coordination lives in store constraints
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p atrium-api
//! ```

use axum::{extract::Request, ServiceExt};
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atrium_api::app::{build_router, AppState};
use atrium_api::config::Config;
use atrium_api::middleware::tenant::tenant_router_middleware;
use atrium_shared::db::migrations::run_migrations;
use atrium_shared::db::pool::{create_pool, DatabaseConfig};
use atrium_shared::identity::provider::{
    HttpIdentityProvider, IdentityProvider, NullIdentityProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "atrium_api=debug,atrium_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Atrium API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let identity: Arc<dyn IdentityProvider> =
        match (&config.identity.api_url, &config.identity.api_key) {
            (Some(api_url), Some(api_key)) => Arc::new(HttpIdentityProvider::new(
                api_url.clone(),
                api_key.clone(),
                Duration::from_secs(config.identity.timeout_seconds),
            )?),
            _ => {
                tracing::warn!(
                    "IDENTITY_API_URL/IDENTITY_API_KEY not set; role metadata propagation disabled"
                );
                Arc::new(NullIdentityProvider)
            }
        };

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config, identity);

    // The tenant router must wrap the finished router (not be added via
    // `Router::layer`) so its URI rewrites re-enter path matching.
    let router = build_router(state.clone());
    let app = axum::middleware::from_fn_with_state(state, tenant_router_middleware).layer(router);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
