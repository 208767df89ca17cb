//! One-shot snapshot run for schedulers (cron, k8s CronJob).
//!
//! Exits non-zero only when configuration or startup fails, or when every
//! branch failed; partial failures are logged and reported on stdout.

use anyhow::Context;

use stockpulse_api::app::build_services;
use stockpulse_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockpulse_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = build_services(&config).await?;

    let report = services.pipeline.run().await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    anyhow::ensure!(
        report.branches.is_empty() || report.failed() < report.branches.len(),
        "every branch failed for {}",
        report.snapshot_date
    );
    Ok(())
}
