use bb::config::{database::get_database, AppConfig};
use bb::migration::Migrator;
use bb::routes::create_app;
use bb::templates::{TemplateStore, RELOAD_INTERVAL};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bb=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let config = AppConfig::from_env()?;

    tracing::info!("Starting bb v{}...", env!("CARGO_PKG_VERSION"));

    let templates = Arc::new(TemplateStore::load(&config.template_dir)?);
    tracing::info!("Templates loaded from {:?}", templates.dir());

    let db = get_database(&config.database_url).await?;
    tracing::info!("Database connected successfully");

    Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reloader = if config.dev_mode {
        tracing::warn!("DEV mode: freshness checks disabled, templates reload on change");
        Some(Arc::clone(&templates).spawn_reloader(RELOAD_INTERVAL, shutdown_rx))
    } else {
        None
    };

    let addr = config.addr();
    let app = create_app(db, templates, config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tx.send_replace(true);
    if let Some(reloader) = reloader {
        if let Err(e) = reloader.await {
            tracing::warn!("Template reloader ended abnormally: {}", e);
        }
    }

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
