use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    routing::{get, MethodRouter},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::cli::ServeArgs;
use crate::service::Catalog;
use crate::store::Database;
use crate::web::{genes, health, reports, variants};

/// Request limits applied to every route
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 100;
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024; // 1MB

/// Shared application state
pub struct AppState {
    pub catalog: Catalog,
}

/// Per-IP token bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub per_second: u64,
    pub burst: u32,
}

/// HTTP runtime settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub request_timeout: Duration,
    pub concurrency_limit: usize,
    pub body_limit: usize,
    /// Single allowed CORS origin; no CORS layer when unset
    pub cors_origin: Option<String>,
    /// Needs connection info, so only the real listener can enable it
    pub rate_limit: Option<RateLimit>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            body_limit: DEFAULT_BODY_LIMIT,
            cors_origin: None,
            rate_limit: None,
        }
    }
}

impl From<&ServeArgs> for ServerConfig {
    fn from(args: &ServeArgs) -> Self {
        let rate_limit = (args.rate_limit_per_second > 0 && args.rate_limit_burst > 0).then_some(
            RateLimit {
                per_second: args.rate_limit_per_second,
                burst: args.rate_limit_burst,
            },
        );
        Self {
            cors_origin: args.cors_origin.clone().filter(|o| !o.trim().is_empty()),
            rate_limit,
            ..Self::default()
        }
    }
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created, the database
/// cannot be opened, or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Register a route under both its trailing-slash and bare forms
fn route_both<S>(router: Router<S>, path: &str, method_router: MethodRouter<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let bare = path.trim_end_matches('/');
    router
        .route(path, method_router.clone())
        .route(bare, method_router)
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{origin}': {e}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the CORS origin or rate limit settings are invalid.
pub fn create_router(catalog: Catalog, config: &ServerConfig) -> anyhow::Result<Router> {
    let state = Arc::new(AppState { catalog });

    let mut router = Router::new();
    router = route_both(router, "/health/", get(health::health));
    router = route_both(router, "/health/status/", get(health::status));

    router = route_both(router, "/genes/", get(genes::list).post(genes::create));
    router = route_both(router, "/genes/by_symbol/", get(genes::by_symbol));
    router = route_both(
        router,
        "/genes/{id}/",
        get(genes::retrieve)
            .put(genes::update)
            .patch(genes::partial_update)
            .delete(genes::delete),
    );

    router = route_both(
        router,
        "/genetic-variants/",
        get(variants::list).post(variants::create),
    );
    router = route_both(
        router,
        "/genetic-variants/{id}/",
        get(variants::retrieve)
            .put(variants::update)
            .patch(variants::partial_update)
            .delete(variants::delete),
    );

    router = route_both(
        router,
        "/patient-variant-reports/",
        get(reports::list).post(reports::create),
    );
    router = route_both(
        router,
        "/patient-variant-reports/by_patient/",
        get(reports::by_patient),
    );
    router = route_both(
        router,
        "/patient-variant-reports/{id}/",
        get(reports::retrieve)
            .put(reports::update)
            .patch(reports::partial_update)
            .delete(reports::delete),
    );

    let mut app = router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            // Security headers for browser protection
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.request_timeout,
            ))
            .layer(ConcurrencyLimitLayer::new(config.concurrency_limit))
            .layer(DefaultBodyLimit::max(config.body_limit)),
    );

    if let Some(origin) = config.cors_origin.as_deref() {
        app = app.layer(cors_layer(origin)?);
    }

    if let Some(limit) = config.rate_limit {
        let governor_conf = GovernorConfigBuilder::default()
            .per_second(limit.per_second)
            .burst_size(limit.burst)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit settings: {limit:?}"))?;
        app = app.layer(GovernorLayer {
            config: Arc::new(governor_conf),
        });
    }

    Ok(app)
}

fn open_database(args: &ServeArgs) -> anyhow::Result<Database> {
    if args.in_memory {
        tracing::warn!("Using an in-memory database; data is lost on shutdown");
        Ok(Database::open_in_memory()?)
    } else {
        tracing::info!("Using database {}", args.database.display());
        Ok(Database::open(&args.database)?)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let db = open_database(&args)?;
    let config = ServerConfig::from(&args);
    let app = create_router(Catalog::new(db), &config)?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting geno-catalog server at http://{addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
