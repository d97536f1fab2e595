//! One-shot due-posting verification sweep, suitable for cron.
//!
//! Prints the sweep results as JSON on stdout. Never accepts applications.

use std::sync::Arc;

use anyhow::{Context, Result};
use matchmaker::{
    config::ConfigLoader, db, eligibility::EligibilityService,
    repositories::ApplicationRepository, telemetry,
};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    telemetry::init_tracing(&config)?;

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    db::migrate(&db).await?;

    let service = EligibilityService::new(Arc::new(ApplicationRepository::new(Arc::new(db))));
    let (processed_count, results) = service
        .verify_due()
        .await
        .context("running due verification sweep")?;

    let eligible = results.iter().filter(|r| r.eligible).count();
    tracing::info!(processed_count, eligible, total = results.len(), "Sweep complete");

    let output = json!({ "processedCount": processed_count, "results": results });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
