/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use rentease_api::{app::{build_router, AppState}, config::Config};
/// use rentease_shared::store::MemoryUserStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryUserStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{role_gate::require_role_layer, security::SecurityHeadersLayer},
    uploads::MAX_UPLOAD_BYTES,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use rentease_shared::{
    auth::middleware::create_session_middleware,
    credentials::CredentialStore,
    identity::IdentityService,
    models::Role,
    notifications::PaymentBroadcaster,
    relationships::RelationshipIndex,
    store::UserStore,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler via Axum's `State` extractor; all members are
/// cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityService,

    pub relationships: RelationshipIndex,

    pub broadcaster: PaymentBroadcaster,

    /// Storage backend, for health checks
    pub store: Arc<dyn UserStore>,

    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the services on top of `store`
    pub fn new(store: Arc<dyn UserStore>, config: Config) -> Self {
        let credentials =
            CredentialStore::new(store.clone()).with_reset_token_ttl(config.reset_token_ttl());

        Self {
            identity: IdentityService::new(credentials),
            relationships: RelationshipIndex::new(store.clone()),
            broadcaster: PaymentBroadcaster::new(config.realtime.broadcast_capacity),
            store,
            config: Arc::new(config),
        }
    }

    /// Secret for signing session cookies
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET  /health
/// ├── GET  /login                      # login page notice
/// ├── POST /register, /login, /logout
/// ├── POST /request_reset, /reset_password
/// ├── GET  /dashboard/landlord          # landlords only, else 302 /login
/// ├── GET  /dashboard/tenant            # tenants only, else 302 /login
/// ├── GET  /api/landlords
/// ├── GET  /api/landlord/tenants, /api/landlord/info
/// ├── POST /api/landlord/settings       # multipart
/// ├── GET  /api/tenant/info
/// ├── POST /api/tenant/settings         # multipart
/// ├── POST /pay
/// └── GET  /ws                          # dashboard WebSocket
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, request tracing, session cookie
/// resolution. The role gate is a route layer on the dashboard pages only.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", get(routes::auth::login_page).post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/request_reset", post(routes::auth::request_reset))
        .route("/reset_password", post(routes::auth::reset_password));

    let landlord_pages = Router::new()
        .route("/dashboard/landlord", get(routes::dashboard::landlord_dashboard))
        .route_layer(middleware::from_fn(require_role_layer(Role::Landlord)));

    let tenant_pages = Router::new()
        .route("/dashboard/tenant", get(routes::dashboard::tenant_dashboard))
        .route_layer(middleware::from_fn(require_role_layer(Role::Tenant)));

    let account_routes = Router::new()
        .route("/landlords", get(routes::landlord::list_landlords))
        .route("/landlord/tenants", get(routes::landlord::list_tenants))
        .route("/landlord/info", get(routes::landlord::landlord_info))
        .route("/landlord/settings", post(routes::landlord::update_settings))
        .route("/tenant/info", get(routes::tenant::tenant_info))
        .route("/tenant/settings", post(routes::tenant::update_settings))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    let realtime_routes = Router::new()
        .route("/pay", post(routes::payments::pay))
        .route("/ws", get(routes::realtime::dashboard_socket));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        // Session cookies need credentialed CORS
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .merge(auth_routes)
        .merge(landlord_pages)
        .merge(tenant_pages)
        .nest("/api", account_routes)
        .merge(realtime_routes)
        .layer(middleware::from_fn(create_session_middleware(
            state.session_secret().to_string(),
        )))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
