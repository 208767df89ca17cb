//! Typed pipeline stages: fetch → dedupe → compute → assemble → persist.
//!
//! Each stage is a plain function over the previous stage's output so the
//! branch runner can compose them and tests can exercise them one by one.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

use stockpulse_core::{BranchCode, SkuNumber};
use stockpulse_replenishment::{ComputedRow, ReplenishmentConfig, SkuBranchRecord, compute_row};

use super::PipelineError;
use crate::provider::SkuFactsProvider;
use crate::snapshot::{AppendOutcome, Snapshot, SnapshotStore};

/// Fetch raw facts and apply record defaults.
///
/// Facts that cannot become a record (blank branch or SKU code) are logged
/// and dropped; they never fail the branch.
pub async fn fetch<P>(provider: &P, branch: &BranchCode) -> Result<Vec<SkuBranchRecord>, PipelineError>
where
    P: SkuFactsProvider + ?Sized,
{
    let raw = provider.fetch_branch(branch).await?;
    let fetched = raw.len();

    let mut records = Vec::with_capacity(fetched);
    for (index, facts) in raw.into_iter().enumerate() {
        match SkuBranchRecord::from_raw(facts) {
            Ok(rec) => records.push(rec),
            Err(e) => warn!(branch = %branch, index, error = %e, "dropping invalid source row"),
        }
    }

    debug!(branch = %branch, fetched, valid = records.len(), "fetched source rows");
    Ok(records)
}

/// Keep the first record per `(branch, sku)`.
pub fn dedupe(records: Vec<SkuBranchRecord>) -> Vec<SkuBranchRecord> {
    let mut seen: HashSet<(BranchCode, SkuNumber)> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert((r.branch_code.clone(), r.sku_number.clone())))
        .collect()
}

pub fn compute(records: &[SkuBranchRecord], rules: &ReplenishmentConfig) -> Vec<ComputedRow> {
    records.iter().map(|r| compute_row(r, rules)).collect()
}

pub fn assemble(snapshot_date: NaiveDate, branch_code: BranchCode, rows: Vec<ComputedRow>) -> Snapshot {
    Snapshot {
        snapshot_date,
        branch_code,
        rows,
    }
}

pub async fn persist<S>(store: &S, snapshot: &Snapshot) -> Result<AppendOutcome, PipelineError>
where
    S: SnapshotStore + ?Sized,
{
    let record = snapshot
        .to_record()
        .map_err(|e| PipelineError::Compute(format!("snapshot serialization failed: {e}")))?;
    Ok(store.append(record).await?)
}
