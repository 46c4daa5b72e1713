use people_enrichment_api::aggregator::Aggregator;
use people_enrichment_api::config::Config;
use people_enrichment_api::db::Database;
use people_enrichment_api::db_storage::PeopleStorage;
use people_enrichment_api::handlers::AppState;
use people_enrichment_api::routes::build_router;
use people_enrichment_api::source_client::SourceClient;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes tracing, configuration, the database pool (with migrations)
/// and the provider aggregator, then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "people_enrichment_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    let client = SourceClient::new()?;
    let aggregator = Aggregator::new(client, config.providers(), config.enrichment_timeout());
    for provider in aggregator.providers() {
        tracing::info!("✓ {} provider: {}", provider.kind, provider.base_url);
    }

    // Build application state
    let app_state = Arc::new(AppState {
        storage: PeopleStorage::new(db.pool.clone()),
        aggregator,
    });

    let app = build_router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
