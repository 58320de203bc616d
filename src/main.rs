//! Competition Registration Backend
//!
//! REST backend for competition team registration: team lifecycle, site
//! capacity accounting, staff approval workflow and seat assignment, backed
//! by SQLite.

mod api;
mod approval;
mod auth;
mod capacity;
mod config;
mod db;
mod directory;
mod errors;
mod models;
mod notify;
mod registry;
mod seating;
mod sites;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use approval::ApprovalPipeline;
use capacity::CapacityLedger;
use config::Config;
use db::Repository;
use directory::Directory;
use notify::Notifier;
use registry::TeamRegistry;
use sites::SiteEngine;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub ledger: Arc<CapacityLedger>,
    pub sites: Arc<SiteEngine>,
    pub registry: Arc<TeamRegistry>,
    pub approvals: Arc<ApprovalPipeline>,
    pub notifier: Notifier,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the components over a database pool.
    pub fn new(pool: sqlx::SqlitePool, config: Config, notifier: Notifier) -> Self {
        let repo = Arc::new(Repository::new(pool.clone()));
        let ledger = Arc::new(CapacityLedger::new(pool));
        let sites = Arc::new(SiteEngine::new(repo.clone(), ledger.clone()));
        let directory = Directory::new(repo.clone());
        let registry = Arc::new(TeamRegistry::new(
            repo.clone(),
            ledger.clone(),
            sites.clone(),
            directory,
            notifier.clone(),
        ));
        let approvals = Arc::new(ApprovalPipeline::new(
            repo.clone(),
            ledger.clone(),
            notifier.clone(),
        ));

        Self {
            repo,
            ledger,
            sites,
            registry,
            approvals,
            notifier,
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Competition Registration Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (COMPREG_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;

    // Notifications are drained to logs; delivery is a downstream concern.
    let (notifier, rx) = Notifier::channel();
    tokio::spawn(notify::log_notifications(rx));

    let bind_addr = config.bind_addr;
    let state = AppState::new(pool, config, notifier);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Users and universities
        .route("/users", post(api::create_user))
        .route("/users/{id}", get(api::get_user))
        .route("/universities", post(api::create_university))
        .route("/universities", get(api::list_universities))
        // Competitions
        .route("/competitions", post(api::create_competition))
        .route("/competitions/{id}", get(api::get_competition))
        .route(
            "/competitions/{id}/default-sites",
            put(api::set_default_site),
        )
        // Sites and seat maps
        .route("/competitions/{id}/sites", post(api::create_site))
        .route("/competitions/{id}/sites", get(api::list_sites))
        .route("/sites/{id}/name", put(api::rename_site))
        .route("/sites/{id}/capacity", get(api::get_capacity))
        .route("/sites/{id}/capacity", put(api::set_capacity))
        .route("/sites/{id}/labs", post(api::create_lab))
        .route("/sites/{id}/labs", get(api::list_labs))
        // Teams
        .route("/competitions/{id}/teams", get(api::list_teams))
        .route("/competitions/{id}/teams/join", post(api::join_individual))
        .route("/competitions/{id}/withdraw", post(api::withdraw))
        .route("/competitions/{id}/close", post(api::close_registration))
        .route("/teams/join", post(api::join_with_code))
        .route("/teams/{id}", get(api::get_team))
        .route("/teams/{id}/name-change", post(api::request_name_change))
        .route("/teams/{id}/site-change", post(api::request_site_change))
        // Approvals
        .route("/competitions/{id}/pending", get(api::pending_overview))
        .route("/competitions/{id}/approvals/teams", post(api::approve_teams))
        .route(
            "/competitions/{id}/approvals/names",
            post(api::decide_name_changes),
        )
        .route(
            "/competitions/{id}/approvals/sites",
            post(api::decide_site_changes),
        )
        // Seating
        .route("/sites/{id}/seating", post(api::run_seating))
        .route("/sites/{id}/seating", get(api::get_seating))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
