use anyhow::Context;
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tasklists::config::AppConfig;
use tasklists::{SharedData, api, logging, persistence, session};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    logging::setup_logging(logging::init_env_filter());

    let config = AppConfig::from_env()?;
    let db = PgPoolOptions::new()
        .max_connections(16)
        .connect(&config.database_url)
        .await
        .context("connecting to the database")?;

    if env::args().any(|arg| arg == "--init-db") {
        persistence::bootstrap::initialize(&db).await?;
        return Ok(());
    }

    let shared = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db),
        sessions: session::SessionSigner::new(&config),
    });
    let router = api::app_router(shared);

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    info!("Listening on {}.", config.listen_addr);
    axum::serve(listener, router)
        .await
        .context("serving the application")?;

    Ok(())
}
