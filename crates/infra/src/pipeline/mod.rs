//! Snapshot generation pipeline.
//!
//! ## Design
//!
//! - Branches are processed sequentially, in configured order
//! - Each branch attempt runs the typed stages and is bounded by a timeout
//! - Failed attempts are retried with backoff (`RetryPolicy`)
//! - A failing branch is logged and reported; the run always continues
//! - The run returns a `RunReport` with one outcome per branch

pub mod retry;
pub mod stages;

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use stockpulse_core::BranchCode;
use stockpulse_replenishment::ReplenishmentConfig;

use crate::provider::{DataProviderError, SkuFactsProvider};
use crate::snapshot::{AppendOutcome, PersistenceError, SnapshotStore};

pub use retry::{BackoffStrategy, RetryPolicy};

/// Default branch codes, in reporting order.
pub const DEFAULT_BRANCHES: [&str; 26] = [
    "00TR", "01TJ", "02TN", "03TS", "04TP", "05AY", "06RY", "07RB", "08NR", "09UB", "10KK", "11PL",
    "12CM", "13SR", "14HY", "15CB", "16PK", "17CR", "18UD", "19PC", "20SK", "21BS", "22BP", "23NS",
    "24TL", "25SB",
];

/// Stage-tagged pipeline errors. Never escape a branch.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] DataProviderError),

    #[error("compute failed: {0}")]
    Compute(String),

    #[error("persist failed: {0}")]
    Persist(#[from] PersistenceError),

    #[error("branch attempt timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub branches: Vec<BranchCode>,
    pub retry: RetryPolicy,
    /// Upper bound for one attempt of one branch (fetch through persist).
    pub branch_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            branches: default_branches(),
            retry: RetryPolicy::default(),
            branch_timeout: Duration::from_secs(120),
        }
    }
}

pub fn default_branches() -> Vec<BranchCode> {
    DEFAULT_BRANCHES
        .iter()
        .filter_map(|code| BranchCode::new(code).ok())
        .collect()
}

/// Result of processing one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum BranchOutcome {
    Written { rows: usize, attempts: u32 },
    /// Nothing was written.
    Skipped { reason: SkipReason },
    Failed { error: String, attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// The source had no usable rows.
    NoRows,
    /// A snapshot for this branch and date was already stored.
    AlreadyWritten,
}

/// What one successful attempt did.
enum Attempt {
    Written(usize),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchReport {
    pub branch_code: BranchCode,
    #[serde(flatten)]
    pub outcome: BranchOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub snapshot_date: NaiveDate,
    pub branches: Vec<BranchReport>,
}

impl RunReport {
    pub fn outcome_for(&self, branch: &BranchCode) -> Option<&BranchOutcome> {
        self.branches
            .iter()
            .find(|b| &b.branch_code == branch)
            .map(|b| &b.outcome)
    }

    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, BranchOutcome::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, BranchOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, BranchOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&BranchOutcome) -> bool) -> usize {
        self.branches.iter().filter(|b| pred(&b.outcome)).count()
    }
}

/// Fetches, computes and persists one snapshot per configured branch.
pub struct SnapshotPipeline<P: ?Sized, S: ?Sized> {
    provider: Arc<P>,
    store: Arc<S>,
    rules: ReplenishmentConfig,
    config: PipelineConfig,
}

impl<P, S> SnapshotPipeline<P, S>
where
    P: SkuFactsProvider + ?Sized,
    S: SnapshotStore + ?Sized,
{
    pub fn new(provider: Arc<P>, store: Arc<S>, rules: ReplenishmentConfig, config: PipelineConfig) -> Self {
        Self {
            provider,
            store,
            rules,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generate today's (UTC) snapshots.
    pub async fn run(&self) -> RunReport {
        self.run_for(Utc::now().date_naive()).await
    }

    #[instrument(skip_all, fields(snapshot_date = %snapshot_date, branches = self.config.branches.len()))]
    pub async fn run_for(&self, snapshot_date: NaiveDate) -> RunReport {
        info!("snapshot run started");

        let mut branches = Vec::with_capacity(self.config.branches.len());
        for branch in &self.config.branches {
            let outcome = self.run_branch(snapshot_date, branch).await;
            branches.push(BranchReport {
                branch_code: branch.clone(),
                outcome,
            });
        }

        let report = RunReport {
            snapshot_date,
            branches,
        };
        info!(
            written = report.written(),
            skipped = report.skipped(),
            failed = report.failed(),
            "snapshot run finished"
        );
        report
    }

    async fn run_branch(&self, snapshot_date: NaiveDate, branch: &BranchCode) -> BranchOutcome {
        let timeout = self.config.branch_timeout;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let result = match tokio::time::timeout(timeout, self.attempt_branch(snapshot_date, branch)).await {
                Ok(result) => result,
                Err(_) => Err(PipelineError::Timeout(timeout)),
            };

            match result {
                Ok(Attempt::Written(rows)) => {
                    info!(branch = %branch, rows, attempts, "snapshot written");
                    return BranchOutcome::Written { rows, attempts };
                }
                Ok(Attempt::Skipped(reason)) => {
                    warn!(branch = %branch, ?reason, "branch skipped");
                    return BranchOutcome::Skipped { reason };
                }
                Err(e) if self.config.retry.should_retry(attempts) => {
                    let delay = self.config.retry.delay_for_attempt(attempts);
                    warn!(
                        branch = %branch,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "branch attempt failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(branch = %branch, attempts, error = %e, "branch failed; continuing with next branch");
                    return BranchOutcome::Failed {
                        error: e.to_string(),
                        attempts,
                    };
                }
            }
        }
    }

    /// One attempt: fetch through persist.
    #[instrument(skip_all, fields(branch = %branch), err)]
    async fn attempt_branch(
        &self,
        snapshot_date: NaiveDate,
        branch: &BranchCode,
    ) -> Result<Attempt, PipelineError> {
        let records = stages::fetch(&*self.provider, branch).await?;
        if records.is_empty() {
            return Ok(Attempt::Skipped(SkipReason::NoRows));
        }

        let records = stages::dedupe(records);
        let rows = stages::compute(&records, &self.rules);
        let snapshot = stages::assemble(snapshot_date, branch.clone(), rows);
        match stages::persist(&*self.store, &snapshot).await? {
            AppendOutcome::Written => Ok(Attempt::Written(snapshot.rows.len())),
            AppendOutcome::AlreadyExists => Ok(Attempt::Skipped(SkipReason::AlreadyWritten)),
        }
    }
}
