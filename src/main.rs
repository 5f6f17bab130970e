//! DonorOps Back-Office Backend
//!
//! List management for blog articles, resources, partners, team members and
//! projects, stored as JSON collections in SQLite and served over a REST API.

mod api;
mod auth;
mod bulk;
mod config;
mod dashboard;
mod db;
mod errors;
mod export;
mod models;
mod view;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use clap::{Parser, Subcommand, ValueEnum};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use dashboard::DashboardService;
use db::{MemoryStorage, Repository, SqliteStorage, Storage};
use errors::AppError;
use models::{BlogArticle, Distributor, Entity, Project, Resource, Supplier, TeamMember};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub dashboard: Arc<DashboardService>,
    pub config: Arc<Config>,
}

#[derive(Parser, Debug)]
#[command(name = "donorops-backend", version, about = "DonorOps back-office backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Write seed data into empty collections, then exit
    Seed,
    /// Export one collection as CSV
    Export {
        collection: Collection,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
        /// Comma-separated column list; the collection's default columns when omitted
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Collection {
    Blog,
    Resources,
    Suppliers,
    Distributors,
    Team,
    Projects,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_tracing(&config);

    let storage = open_storage(&config).await?;
    let repo = Arc::new(Repository::new(storage));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, repo).await?,
        Command::Seed => {
            let report = db::seed::seed_all(&repo).await?;
            tracing::info!(
                "Seeded: {:?}, already present: {:?}",
                report.seeded,
                report.skipped
            );
        }
        Command::Export {
            collection,
            out,
            columns,
        } => {
            let csv = match collection {
                Collection::Blog => export_collection::<BlogArticle>(&repo, &columns).await?,
                Collection::Resources => export_collection::<Resource>(&repo, &columns).await?,
                Collection::Suppliers => export_collection::<Supplier>(&repo, &columns).await?,
                Collection::Distributors => {
                    export_collection::<Distributor>(&repo, &columns).await?
                }
                Collection::Team => export_collection::<TeamMember>(&repo, &columns).await?,
                Collection::Projects => export_collection::<Project>(&repo, &columns).await?,
            };

            match out {
                Some(path) => {
                    export::write_to(&path, &csv).await?;
                    tracing::info!("Wrote {}", path.display());
                }
                None => print!("{}", csv),
            }
        }
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // Logs go to stderr so CSV exports on stdout stay clean
    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

async fn open_storage(config: &Config) -> Result<Arc<dyn Storage>, AppError> {
    if config.uses_memory_storage() {
        tracing::warn!("Using in-memory storage; data is lost on exit");
        return Ok(Arc::new(
            MemoryStorage::new().with_quota(config.storage_quota_bytes),
        ));
    }

    tracing::info!("Database path: {:?}", config.db_path);
    let pool = db::init_database(&config.db_path).await?;
    Ok(Arc::new(
        SqliteStorage::new(pool).with_quota(config.storage_quota_bytes),
    ))
}

async fn export_collection<E: Entity>(
    repo: &Repository,
    columns: &[String],
) -> Result<String, AppError> {
    let records = repo.store::<E>().list().await?;
    export::export_csv(&records, columns)
}

async fn serve(config: Config, repo: Arc<Repository>) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting DonorOps backend");
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (DONOROPS_API_PSK). Authentication is disabled!");
    }

    if config.seed_on_start {
        db::seed::seed_all(&repo).await?;
    }

    let dashboard = DashboardService::new(
        config.dashboard_api_url.clone(),
        config.dashboard_timeout,
    )?;
    if dashboard.is_remote() {
        tracing::info!(
            "Dashboard remote source: {}",
            config.dashboard_api_url.as_deref().unwrap_or_default()
        );
    }

    // Create application state
    let state = AppState {
        repo,
        dashboard: Arc::new(dashboard),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

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

    // Admin routes
    let api_routes = Router::new()
        // Datastore
        .route("/datastore", get(api::get_datastore))
        .route("/datastore/revision", get(api::get_revision))
        .route("/dashboard", get(api::get_dashboard))
        // Collections
        .nest("/blog", api::entity_routes::<BlogArticle>())
        .nest("/resources", api::entity_routes::<Resource>())
        .nest("/suppliers", api::entity_routes::<Supplier>())
        .nest("/distributors", api::entity_routes::<Distributor>())
        .nest("/team", api::entity_routes::<TeamMember>())
        .nest("/projects", api::entity_routes::<Project>())
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Website routes (no auth required)
    let public_routes = Router::new()
        .route("/blog", get(api::list_public_articles))
        .route("/blog/{slug}", get(api::get_public_article))
        .route("/resources", get(api::list_public_resources))
        .route("/resources/{id}", get(api::get_public_resource));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .nest("/public", public_routes)
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
