/// Application state and router builder
///
/// This module defines the shared application state and provides a function
/// to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use atrium_api::{app::AppState, config::Config};
/// use atrium_shared::identity::provider::NullIdentityProvider;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config, Arc::new(NullIdentityProvider));
/// let app = atrium_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use atrium_shared::identity::{provider::IdentityProvider, token::validate_session_token};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Identity-provider boundary for outbound role propagation
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            identity,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                             # Health check (public)
/// └── /v1/                                # API v1 (session-token auth)
///     ├── POST /session                   # Session establishment / invitation resolution
///     ├── GET  /me                        # Current user with agency context
///     ├── POST /agencies                  # Create agency + provision owner
///     ├── PUT  /agencies/:id              # Update agency details
///     ├── DELETE /agencies/:id            # Delete agency (owner only)
///     ├── PUT  /agencies/:id/goal         # Update sub-account goal
///     ├── POST /agencies/:id/subaccounts  # Create/update a sub-account
///     ├── GET  /agencies/:id/subaccounts  # List sub-accounts
///     ├── POST /agencies/:id/invitations  # Invite a user (admin only)
///     ├── GET  /agencies/:id/invitations  # List pending invitations
///     ├── GET  /agencies/:id/notifications# Activity feed
///     └── PUT  /users/:id/role            # Change a user's role
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top): security headers, CORS, request
/// tracing, then per-group session authentication. The tenant host-routing
/// middleware is *not* part of this router — it must wrap the router so
/// that URI rewrites re-enter path matching (see `main.rs`).
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Everything under /v1 requires a valid provider session token
    let v1_routes = Router::new()
        .route("/session", post(routes::session::establish_session))
        .route("/me", get(routes::users::current_user))
        .route("/agencies", post(routes::agencies::create_agency))
        .route(
            "/agencies/:agency_id",
            put(routes::agencies::update_agency).delete(routes::agencies::delete_agency),
        )
        .route("/agencies/:agency_id/goal", put(routes::agencies::update_goal))
        .route(
            "/agencies/:agency_id/subaccounts",
            post(routes::sub_accounts::upsert_sub_account)
                .get(routes::sub_accounts::list_sub_accounts),
        )
        .route(
            "/agencies/:agency_id/invitations",
            post(routes::invitations::create_invitation)
                .get(routes::invitations::list_invitations),
        )
        .route(
            "/agencies/:agency_id/notifications",
            get(routes::notifications::list_notifications),
        )
        .route("/users/:user_id/role", put(routes::users::update_role))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Validates the provider-issued session token from the Authorization
/// header and injects the resulting [`VerifiedIdentity`] into request
/// extensions.
///
/// [`VerifiedIdentity`]: atrium_shared::identity::VerifiedIdentity
async fn session_auth_layer(
    state: State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let identity = validate_session_token(
        token,
        &state.config.session.secret,
        &state.config.session.issuer,
    )?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
