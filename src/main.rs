use anyhow::Context;
use fieldbook::bootstrap;
use fieldbook::config::Config;
use fieldbook::infrastructure::http::router::build_router;
use fieldbook::infrastructure::observability;
use fieldbook::infrastructure::persistence::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    let _guard = observability::init(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize observability: {}", e))?;
    tracing::info!("Configuration loaded");

    // Initialize database connection
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection established");

    // Run migrations
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations applied");

    // Build application state (and start background services)
    let state = bootstrap::build_app_state(db, &config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build application state: {}", e))?;

    let app = build_router(state);

    let addr = config.server_address();
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
