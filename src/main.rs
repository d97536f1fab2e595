//! # Matchmaker Main Entry Point

use anyhow::Context;
use matchmaker::{config::ConfigLoader, db, server::run_server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    telemetry::init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted) = config.redacted_json() {
        tracing::debug!(config = %redacted, "Effective configuration");
    }
    if config.scoring.gemini_api_key.is_none() && config.scoring.openai_api_key.is_none() {
        tracing::warn!("No scoring provider credentials configured; local scoring only");
    }

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    db::migrate(&db).await?;

    run_server(config, db).await
}
