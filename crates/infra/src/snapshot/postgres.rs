//! Postgres-backed snapshot store.
//!
//! Snapshots live in `stock_status_snapshot`, one row per written document:
//!
//! | column | type | |
//! |---|---|---|
//! | `id` | `BIGSERIAL` | write order |
//! | `snapshot_date` | `DATE` | |
//! | `branch_code` | `TEXT` | |
//! | `json_data` | `JSONB` | serialized `Snapshot` |
//! | `created_at` | `TIMESTAMPTZ` | |
//!
//! `(branch_code, snapshot_date)` is unique: re-running a day, or retrying an
//! attempt whose insert already committed, leaves the first document in place.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use tracing::{Span, instrument};

use stockpulse_core::BranchCode;

use super::r#trait::{AppendOutcome, PersistenceError, SnapshotRecord, SnapshotStore};

#[derive(Debug, Clone)]
pub struct PostgresSnapshotStore {
    pool: Arc<PgPool>,
}

impl PostgresSnapshotStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the snapshot table and its unique lookup index when missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stock_status_snapshot (
                id            BIGSERIAL PRIMARY KEY,
                snapshot_date DATE        NOT NULL,
                branch_code   TEXT        NOT NULL,
                json_data     JSONB       NOT NULL,
                created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS stock_status_snapshot_branch_date_key
                ON stock_status_snapshot (branch_code, snapshot_date)
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for PostgresSnapshotStore {
    #[instrument(
        skip(self, record),
        fields(
            branch = %record.branch_code,
            snapshot_date = %record.snapshot_date
        ),
        err
    )]
    async fn append(&self, record: SnapshotRecord) -> Result<AppendOutcome, PersistenceError> {
        let result = sqlx::query(
            r#"
            INSERT INTO stock_status_snapshot (snapshot_date, branch_code, json_data)
            VALUES ($1, $2, $3)
            ON CONFLICT (branch_code, snapshot_date) DO NOTHING
            "#,
        )
        .bind(record.snapshot_date)
        .bind(record.branch_code.as_str())
        .bind(&record.json_data)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("append", e))?;

        if result.rows_affected() == 0 {
            return Ok(AppendOutcome::AlreadyExists);
        }
        Ok(AppendOutcome::Written)
    }

    #[instrument(skip(self), fields(record_count), err)]
    async fn by_date(&self, date: NaiveDate) -> Result<Vec<SnapshotRecord>, PersistenceError> {
        let rows = sqlx::query(
            r#"
            SELECT snapshot_date, branch_code, json_data
            FROM stock_status_snapshot
            WHERE snapshot_date = $1
            ORDER BY id ASC
            "#,
        )
        .bind(date)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("by_date", e))?;

        let records = decode_rows(&rows)?;
        Span::current().record("record_count", records.len());
        Ok(records)
    }

    #[instrument(skip(self), fields(record_count), err)]
    async fn latest_per_branch(&self) -> Result<Vec<SnapshotRecord>, PersistenceError> {
        let rows = sqlx::query(
            r#"
            SELECT s.snapshot_date, s.branch_code, s.json_data
            FROM stock_status_snapshot s
            JOIN (
                SELECT branch_code, MAX(snapshot_date) AS max_date
                FROM stock_status_snapshot
                GROUP BY branch_code
            ) latest
              ON s.branch_code = latest.branch_code
             AND s.snapshot_date = latest.max_date
            ORDER BY s.id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("latest_per_branch", e))?;

        let records = decode_rows(&rows)?;
        Span::current().record("record_count", records.len());
        Ok(records)
    }
}

fn decode_rows(rows: &[sqlx::postgres::PgRow]) -> Result<Vec<SnapshotRecord>, PersistenceError> {
    rows.iter()
        .map(|row| {
            let branch: String = row.try_get("branch_code").map_err(decode_error)?;
            Ok(SnapshotRecord {
                snapshot_date: row.try_get("snapshot_date").map_err(decode_error)?,
                branch_code: BranchCode::new(&branch)
                    .map_err(|e| PersistenceError::Decode(format!("branch_code {branch:?}: {e}")))?,
                json_data: row.try_get("json_data").map_err(decode_error)?,
            })
        })
        .collect()
}

fn decode_error(err: sqlx::Error) -> PersistenceError {
    PersistenceError::Decode(format!("failed to deserialize snapshot row: {err}"))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> PersistenceError {
    match err {
        sqlx::Error::Database(db_err) => {
            PersistenceError::Storage(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            PersistenceError::Unavailable(format!("{operation}: {err}"))
        }
        _ => PersistenceError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}
