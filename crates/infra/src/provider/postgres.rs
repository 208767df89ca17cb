//! Postgres-backed SKU facts provider.
//!
//! Reads the pre-assembled `sku_branch_facts` table, one row per SKU and
//! branch. The table is maintained by the upstream reporting jobs; this
//! adapter only reads it. Every column except the identifiers is nullable and
//! arrives in the [`RawSkuFacts`] shape untouched, so defaults are applied in
//! exactly one place downstream.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Row};
use tracing::{Span, instrument};

use stockpulse_core::BranchCode;
use stockpulse_replenishment::RawSkuFacts;

use super::r#trait::{DataProviderError, SkuFactsProvider};

#[derive(Debug, Clone)]
pub struct PostgresSkuFactsProvider {
    pool: Arc<PgPool>,
}

impl PostgresSkuFactsProvider {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl SkuFactsProvider for PostgresSkuFactsProvider {
    #[instrument(skip(self), fields(branch = %branch, row_count), err)]
    async fn fetch_branch(&self, branch: &BranchCode) -> Result<Vec<RawSkuFacts>, DataProviderError> {
        let rows = sqlx::query(
            r#"
            SELECT
                branch_code,
                sku_number,
                product_name,
                base_unit,
                brand_name,
                acc_group_name,
                item_group,
                new_item,
                lt_po,
                lt_sup,
                lt_dc,
                on_hand_qty,
                backlog,
                frequency,
                sales6,
                demand9
            FROM sku_branch_facts
            WHERE branch_code = $1
            ORDER BY sku_number ASC
            "#,
        )
        .bind(branch.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_branch", e))?;

        let mut facts = Vec::with_capacity(rows.len());
        for row in &rows {
            facts.push(facts_from_row(row).map_err(|e| {
                DataProviderError::Malformed(format!("failed to decode sku_branch_facts row: {e}"))
            })?);
        }

        Span::current().record("row_count", facts.len());
        Ok(facts)
    }
}

fn facts_from_row(row: &sqlx::postgres::PgRow) -> Result<RawSkuFacts, sqlx::Error> {
    let number = |col: &str| -> Result<Option<JsonValue>, sqlx::Error> {
        Ok(row.try_get::<Option<f64>, _>(col)?.map(JsonValue::from))
    };

    Ok(RawSkuFacts {
        branch_code: row.try_get("branch_code")?,
        sku_number: row.try_get("sku_number")?,
        product_name: row.try_get("product_name")?,
        base_unit: row.try_get("base_unit")?,
        brand_name: row.try_get("brand_name")?,
        acc_group_name: row.try_get("acc_group_name")?,
        item_group: row.try_get("item_group")?,
        new_item: row.try_get::<Option<bool>, _>("new_item")?.map(JsonValue::Bool),
        lt_po: number("lt_po")?,
        lt_sup: number("lt_sup")?,
        lt_dc: number("lt_dc")?,
        on_hand_qty: number("on_hand_qty")?,
        backlog: number("backlog")?,
        frequency: row.try_get::<Option<i32>, _>("frequency")?.map(JsonValue::from),
        sales6: row.try_get("sales6")?,
        demand9: row.try_get("demand9")?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DataProviderError {
    match err {
        sqlx::Error::Database(db_err) => {
            DataProviderError::Query(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            DataProviderError::Unavailable(format!("{operation}: {err}"))
        }
        _ => DataProviderError::Query(format!("sqlx error in {}: {}", operation, err)),
    }
}
