//! Snapshot retrieval: merge stored branch snapshots into one result.
//!
//! Reads never recompute. Rows of every matching record are concatenated and
//! stable-sorted by the numeric branch prefix (`"05AY"` → 5), so branches come
//! out in reporting order and rows keep their computed order within a branch.

pub mod sort;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{instrument, warn};

use stockpulse_core::BranchCode;
use stockpulse_replenishment::ComputedRow;

use crate::snapshot::{PersistenceError, SnapshotRecord, SnapshotStore};

pub use sort::{RowSort, SortKey, SortOrder, natural_cmp};

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid snapshot date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error(transparent)]
    Store(#[from] PersistenceError),
}

/// Parse a `YYYY-MM-DD` query date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, RetrievalError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| RetrievalError::InvalidDate(raw.to_string()))
}

/// Merged rows of one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockStatusResult {
    pub count: usize,
    pub rows: Vec<ComputedRow>,
}

impl StockStatusResult {
    pub fn from_rows(rows: Vec<ComputedRow>) -> Self {
        Self {
            count: rows.len(),
            rows,
        }
    }

    pub fn sorted_by(mut self, sort: &RowSort) -> Self {
        sort.apply(&mut self.rows);
        self
    }
}

pub struct SnapshotRetrieval<S: ?Sized> {
    store: Arc<S>,
}

impl<S> SnapshotRetrieval<S>
where
    S: SnapshotStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All snapshots written for `date`; no match is an empty result.
    #[instrument(skip(self), err)]
    pub async fn by_date(&self, date: NaiveDate) -> Result<StockStatusResult, RetrievalError> {
        let records = self.store.by_date(date).await?;
        Ok(merge(records))
    }

    /// Each branch's newest snapshot, whatever its date.
    #[instrument(skip(self), err)]
    pub async fn latest_all(&self) -> Result<StockStatusResult, RetrievalError> {
        let records = self.store.latest_per_branch().await?;
        Ok(merge(records))
    }

    pub async fn query(&self, date: Option<NaiveDate>) -> Result<StockStatusResult, RetrievalError> {
        match date {
            Some(d) => self.by_date(d).await,
            None => self.latest_all().await,
        }
    }
}

fn merge(records: Vec<SnapshotRecord>) -> StockStatusResult {
    let mut rows = Vec::new();
    for record in records {
        match record.decode() {
            Ok(snapshot) => rows.extend(snapshot.rows),
            Err(e) => warn!(
                branch = %record.branch_code,
                snapshot_date = %record.snapshot_date,
                error = %e,
                "skipping undecodable snapshot"
            ),
        }
    }

    rows.sort_by_key(|r| branch_order(r.branch_code()));
    StockStatusResult::from_rows(rows)
}

/// Numeric prefix first; codes without one sort after every numbered branch.
fn branch_order(code: &BranchCode) -> (bool, u32) {
    match code.numeric_prefix() {
        Some(n) => (false, n),
        None => (true, 0),
    }
}
