use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use intake_server::config::AppConfig;
use intake_server::database::init_db;
use intake_server::notify::Notifier;
use intake_server::state::{AppState, build_content_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Database schema is in sync");

    let content_store = build_content_store(&config.storage)
        .await
        .context("Failed to initialise content store")?;
    info!(backend = ?config.storage.backend, "Content store ready");

    let notifier = Notifier::from_config(&config.mail).context("Failed to configure mailer")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        content_store,
        notifier,
    };
    let app = intake_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
