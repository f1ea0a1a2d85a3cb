// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use hackradar_core::{
    domains::{
        events::{EventGate, PostgresEventStore},
        scraping::ScrapePipeline,
        sources::{default_sources, Aggregator},
    },
    kernel::{build_http_client, BaseEventStore, ScrapeScheduler},
    server::{build_app, AppState},
    Config,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hackradar_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting HackRadar API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Sources → aggregator → gate → pipeline
    let http_client =
        build_http_client(config.http_timeout).context("Failed to build HTTP client")?;
    let aggregator = Aggregator::new(default_sources(&config.sources, http_client));
    tracing::info!(sources = ?aggregator.source_names(), "Sources registered");

    let store: Arc<dyn BaseEventStore> = Arc::new(PostgresEventStore::new(pool));
    let pipeline = Arc::new(ScrapePipeline::new(aggregator, EventGate::new(store.clone())));
    let scheduler = Arc::new(ScrapeScheduler::new(pipeline, config.scrape_cron.clone()));

    if config.scheduler_autostart {
        scheduler
            .start()
            .await
            .context("Failed to start scrape scheduler")?;
    } else {
        tracing::info!("Scheduler autostart disabled");
    }

    // Build application
    let app = build_app(AppState::new(store, scheduler));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
