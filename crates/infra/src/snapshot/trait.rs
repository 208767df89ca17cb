use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use stockpulse_core::BranchCode;
use stockpulse_replenishment::ComputedRow;

/// One branch's computed rows for one calendar date.
///
/// Snapshots are immutable once written; a later run for the same date adds
/// another document instead of replacing the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub snapshot_date: NaiveDate,
    pub branch_code: BranchCode,
    pub rows: Vec<ComputedRow>,
}

impl Snapshot {
    pub fn to_record(&self) -> Result<SnapshotRecord, serde_json::Error> {
        Ok(SnapshotRecord {
            snapshot_date: self.snapshot_date,
            branch_code: self.branch_code.clone(),
            json_data: serde_json::to_value(self)?,
        })
    }
}

/// Persistence shape of a [`Snapshot`]: date and branch as columns, the
/// document itself as opaque JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub snapshot_date: NaiveDate,
    pub branch_code: BranchCode,
    pub json_data: JsonValue,
}

impl SnapshotRecord {
    pub fn decode(&self) -> Result<Snapshot, serde_json::Error> {
        Snapshot::deserialize(&self.json_data)
    }
}

/// Snapshot store errors.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),

    #[error("snapshot store rejected the operation: {0}")]
    Storage(String),

    #[error("failed to decode stored snapshot: {0}")]
    Decode(String),
}

/// Result of an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Written,
    /// A document for the same `(snapshot_date, branch_code)` already exists; nothing was written.
    AlreadyExists,
}

/// Append-only store of branch snapshots.
///
/// Holds at most one document per `(snapshot_date, branch_code)`; the first
/// write wins and later ones report [`AppendOutcome::AlreadyExists`].
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn append(&self, record: SnapshotRecord) -> Result<AppendOutcome, PersistenceError>;

    /// Every record written for `date`, in write order.
    async fn by_date(&self, date: NaiveDate) -> Result<Vec<SnapshotRecord>, PersistenceError>;

    /// For each branch, the record carrying that branch's newest date.
    async fn latest_per_branch(&self) -> Result<Vec<SnapshotRecord>, PersistenceError>;
}

#[async_trait]
impl<S> SnapshotStore for std::sync::Arc<S>
where
    S: SnapshotStore + ?Sized,
{
    async fn append(&self, record: SnapshotRecord) -> Result<AppendOutcome, PersistenceError> {
        (**self).append(record).await
    }

    async fn by_date(&self, date: NaiveDate) -> Result<Vec<SnapshotRecord>, PersistenceError> {
        (**self).by_date(date).await
    }

    async fn latest_per_branch(&self) -> Result<Vec<SnapshotRecord>, PersistenceError> {
        (**self).latest_per_branch().await
    }
}
