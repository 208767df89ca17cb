use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{info, warn};

use stockpulse_infra::provider::{InMemorySkuFactsProvider, MonthlyDemandProvider, PostgresSkuFactsProvider};
use stockpulse_infra::snapshot::{InMemorySnapshotStore, PostgresSnapshotStore};
use stockpulse_infra::{PipelineConfig, SkuFactsProvider, SnapshotPipeline, SnapshotRetrieval, SnapshotStore};
use stockpulse_replenishment::ReplenishmentConfig;

use crate::config::{AppConfig, load_source_tables};

pub type DynPipeline = SnapshotPipeline<dyn SkuFactsProvider, dyn SnapshotStore>;
pub type DynRetrieval = SnapshotRetrieval<dyn SnapshotStore>;

/// Everything the handlers need, shared behind one `Arc`.
pub struct AppServices {
    pub pipeline: DynPipeline,
    pub retrieval: DynRetrieval,
}

impl AppServices {
    /// Wire a pipeline and a retrieval service over the same store.
    pub fn new(
        provider: Arc<dyn SkuFactsProvider>,
        store: Arc<dyn SnapshotStore>,
        rules: ReplenishmentConfig,
        pipeline: PipelineConfig,
    ) -> Self {
        Self {
            pipeline: SnapshotPipeline::new(provider, store.clone(), rules, pipeline),
            retrieval: SnapshotRetrieval::new(store),
        }
    }

    /// In-memory adapters; used by tests and local runs without a database.
    pub fn in_memory(provider: InMemorySkuFactsProvider, rules: ReplenishmentConfig, pipeline: PipelineConfig) -> Self {
        Self::new(Arc::new(provider), Arc::new(InMemorySnapshotStore::new()), rules, pipeline)
    }
}

/// Build services from process configuration.
///
/// With `DATABASE_URL` set the Postgres adapters are used and the snapshot
/// table is created if missing. Otherwise snapshots stay in memory and SKU
/// facts are assembled from `STOCKPULSE_SOURCE_FILE`.
pub async fn build_services(config: &AppConfig) -> Result<AppServices> {
    let Some(database_url) = config.database_url.as_deref() else {
        return in_memory_services(config);
    };

    let pool = PgPool::connect(database_url)
        .await
        .context("failed to connect to Postgres")?;

    let store = PostgresSnapshotStore::new(pool.clone());
    store
        .ensure_schema()
        .await
        .context("failed to prepare snapshot table")?;
    info!(branches = config.pipeline.branches.len(), "using Postgres provider and snapshot store");

    Ok(AppServices::new(
        Arc::new(PostgresSkuFactsProvider::new(pool)),
        Arc::new(store),
        config.rules.clone(),
        config.pipeline.clone(),
    ))
}

fn in_memory_services(config: &AppConfig) -> Result<AppServices> {
    let store = Arc::new(InMemorySnapshotStore::new());

    let Some(path) = config.source_file.as_deref() else {
        warn!("neither DATABASE_URL nor STOCKPULSE_SOURCE_FILE set; every branch will be skipped");
        return Ok(AppServices::new(
            Arc::new(InMemorySkuFactsProvider::new()),
            store,
            config.rules.clone(),
            config.pipeline.clone(),
        ));
    };

    let source = load_source_tables(path)?;
    info!(
        source = %path.display(),
        items = source.items.len(),
        demand_facts = source.demand.len(),
        "assembling SKU facts from monthly source tables"
    );
    let provider = MonthlyDemandProvider::new(config.rules.windows.clone());
    provider.load(source);

    Ok(AppServices::new(Arc::new(provider), store, config.rules.clone(), config.pipeline.clone()))
}
