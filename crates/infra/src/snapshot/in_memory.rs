use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use stockpulse_core::BranchCode;

use super::r#trait::{AppendOutcome, PersistenceError, SnapshotRecord, SnapshotStore};

/// In-memory append-only snapshot store.
///
/// Intended for tests/dev. Records are kept in write order.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    records: RwLock<Vec<SnapshotRecord>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<SnapshotRecord> {
        self.records
            .read()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<SnapshotRecord>>, PersistenceError> {
        self.records
            .read()
            .map_err(|_| PersistenceError::Unavailable("snapshot lock poisoned".to_string()))
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn append(&self, record: SnapshotRecord) -> Result<AppendOutcome, PersistenceError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| PersistenceError::Unavailable("snapshot lock poisoned".to_string()))?;

        if records
            .iter()
            .any(|r| r.snapshot_date == record.snapshot_date && r.branch_code == record.branch_code)
        {
            return Ok(AppendOutcome::AlreadyExists);
        }
        records.push(record);
        Ok(AppendOutcome::Written)
    }

    async fn by_date(&self, date: NaiveDate) -> Result<Vec<SnapshotRecord>, PersistenceError> {
        Ok(self
            .read()?
            .iter()
            .filter(|r| r.snapshot_date == date)
            .cloned()
            .collect())
    }

    async fn latest_per_branch(&self) -> Result<Vec<SnapshotRecord>, PersistenceError> {
        let records = self.read()?;

        let mut newest: HashMap<&BranchCode, NaiveDate> = HashMap::new();
        for r in records.iter() {
            newest
                .entry(&r.branch_code)
                .and_modify(|d| *d = (*d).max(r.snapshot_date))
                .or_insert(r.snapshot_date);
        }

        Ok(records
            .iter()
            .filter(|r| newest.get(&r.branch_code) == Some(&r.snapshot_date))
            .cloned()
            .collect())
    }
}
